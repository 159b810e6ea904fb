use anyhow::{Context, Result};

use crate::config::CrawlerConfig;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::limiter::RateLimiter;
use crate::pager::{self, PageRange, PageUrl};
use crate::scrapable::{PageLocation, Scrapable, ScrapingContext, Seed};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: usize,
    pub rows: usize,
}

impl CrawlSummary {
    fn add_page(&mut self, rows: usize) {
        self.pages += 1;
        self.rows += rows;
    }
}

pub async fn crawl_site<T>(
    crawler_conf: &CrawlerConfig,
    scraper_conf: &T::Config,
) -> Result<CrawlSummary>
where
    T: Scrapable,
{
    let fetcher = HttpFetcher::new(crawler_conf)?;
    crawl_site_with::<T, _>(&fetcher, crawler_conf, scraper_conf).await
}

/// Crawls the scraper's seed one page at a time through `fetcher`.
///
/// Any retrieval or scraping failure stops the crawl, pages already scraped
/// are left as they are.
pub async fn crawl_site_with<T, F>(
    fetcher: &F,
    crawler_conf: &CrawlerConfig,
    scraper_conf: &T::Config,
) -> Result<CrawlSummary>
where
    T: Scrapable,
    F: Fetcher,
{
    let limiter = RateLimiter::try_from(crawler_conf.throttle)?;
    let mut scraper = <T as Scrapable>::new(scraper_conf)?;

    let res = match scraper.seed() {
        Seed::Listing {
            url,
            start_page,
            page_count,
        } => {
            let crawl = ListingCrawl {
                fetcher,
                limiter: &limiter,
                base_url: &url,
            };
            crawl.run(&mut scraper, start_page, page_count).await
        }
        Seed::Pages(urls) => crawl_pages(fetcher, &limiter, &mut scraper, urls).await,
    };

    scraper.finalizer();
    let summary = res?;
    log::info!("Scraped {} pages into {} rows", summary.pages, summary.rows);

    Ok(summary)
}

struct ListingCrawl<'a, F> {
    fetcher: &'a F,
    limiter: &'a RateLimiter,
    base_url: &'a str,
}

impl<'a, F> ListingCrawl<'a, F>
where
    F: Fetcher,
{
    async fn run<T>(
        &self,
        scraper: &mut T,
        start_page: usize,
        page_count: Option<usize>,
    ) -> Result<CrawlSummary>
    where
        T: Scrapable,
    {
        let page_url = PageUrl::parse(self.base_url)
            .with_context(|| format!("Invalid listing url: {}", self.base_url))?;

        let (range, max) = self.discover_range(start_page, page_count).await?;
        log::info!(
            "Scraping {} pages out of {max} pages available, starting at page {}",
            range.len(),
            range.start
        );

        let mut summary = CrawlSummary::default();
        for n in range.pages() {
            let url = page_url.for_page(n);
            self.limiter.acquire().await;
            log::debug!("Fetching page {n}: {url}");
            let page = self.fetcher.fetch(&url).await?;
            let ctx = ScrapingContext::new(PageLocation::Url(url), Some(n));
            let rows = scraper.scrap(page, ctx)?;
            summary.add_page(rows);
            log::info!("Page {n} done, {rows} rows");
        }

        Ok(summary)
    }

    async fn discover_range(
        &self,
        start_page: usize,
        page_count: Option<usize>,
    ) -> Result<(PageRange, usize)> {
        self.limiter.acquire().await;
        log::debug!("Fetching pager: {}", self.base_url);
        let listing = self.fetcher.fetch(self.base_url).await?;

        let max = pager::last_page(&listing).unwrap_or_else(|| {
            log::warn!("No pager found on {}, assuming a single page", self.base_url);
            1
        });

        let range = PageRange::resolve(start_page, page_count, max)?;
        Ok((range, max))
    }
}

async fn crawl_pages<T, F>(
    fetcher: &F,
    limiter: &RateLimiter,
    scraper: &mut T,
    urls: Vec<String>,
) -> Result<CrawlSummary>
where
    T: Scrapable,
    F: Fetcher,
{
    log::info!("Scraping {} pages", urls.len());

    let mut summary = CrawlSummary::default();
    for url in urls {
        limiter.acquire().await;
        log::debug!("Fetching page: {url}");
        let page = fetcher.fetch(&url).await?;
        let ctx = ScrapingContext::with_location(PageLocation::Url(url.clone()));
        let rows = scraper.scrap(page, ctx)?;
        summary.add_page(rows);
        log::info!("Page {url} done, {rows} rows");
    }

    Ok(summary)
}
