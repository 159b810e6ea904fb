use std::path::PathBuf;

/// Per-page processing plugged into the crawl loop.
pub trait Scrapable {
    type Config: Clone;

    fn new(config: &Self::Config) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn seed(&self) -> Seed;

    /// Processes one retrieved page, returning how many records it produced.
    fn scrap(&mut self, page: String, ctx: ScrapingContext) -> anyhow::Result<usize>;

    fn finalizer(&mut self) {}
}

#[derive(Debug, Clone)]
pub enum Seed {
    /// A paginated listing, walked from `start_page` for `page_count` pages
    /// (every remaining page when `None`).
    Listing {
        url: String,
        start_page: usize,
        page_count: Option<usize>,
    },
    /// Explicit pages, scraped in order.
    Pages(Vec<String>),
}

impl Seed {
    pub fn listing(url: impl Into<String>) -> Self {
        Self::Listing {
            url: url.into(),
            start_page: 1,
            page_count: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageLocation {
    Url(String),
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ScrapingContext {
    location: PageLocation,
    page_number: Option<usize>,
}

impl ScrapingContext {
    pub fn new(location: PageLocation, page_number: Option<usize>) -> Self {
        Self {
            location,
            page_number,
        }
    }

    pub fn with_location(location: PageLocation) -> Self {
        Self::new(location, None)
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    /// Position of the page in its listing, when crawling one.
    pub fn page_number(&self) -> Option<usize> {
        self.page_number
    }
}
