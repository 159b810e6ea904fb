use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::{env, io};

use ao3meta_crawler::{
    crawl_site, CrawlerConfig, Fetcher, HttpFetcher, PageLocation, Seed, Throttle,
};
use ao3meta_scraper::table::ExplodeMode;
use ao3meta_scraper::writer::FileMode;
use ao3meta_scraper::{scrap_page, WorksScraper, WorksScraperConfig};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use fs_err as fs;
use tokio::runtime;

/// Archive listing metadata scraper
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Args {
    #[clap(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[clap(name = "crawl")]
    Crawl(CrawlArgs),
    #[clap(name = "pages")]
    Pages(PagesArgs),
    #[clap(name = "scrap")]
    Scrap(ScrapArgs),
    #[clap(hide = true)]
    Completion,
}

/// Crawl the pages of a works listing into a csv file
#[derive(Debug, clap::Args)]
pub struct CrawlArgs {
    /// Url of the listing, as shown by the archive after filtering
    pub url: String,
    /// First page to scrap
    #[clap(long, default_value = "1")]
    pub start_page: usize,
    /// Number of pages to scrap, every remaining page by default
    #[clap(long)]
    pub pages: Option<usize>,
    #[clap(flatten)]
    pub crawler: CrawlerArgs,
    #[clap(flatten)]
    pub output: OutputArgs,
}

/// Scrap the given listing pages, in order, into a csv file
#[derive(Debug, clap::Args)]
pub struct PagesArgs {
    /// Urls of the pages to scrap
    #[clap(required = true)]
    pub urls: Vec<String>,
    #[clap(flatten)]
    pub crawler: CrawlerArgs,
    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, clap::Args)]
pub struct CrawlerArgs {
    /// Optional default crawler yaml configuration file
    #[clap(env = "AO3META_CRAWLER_CONFIG", parse(from_os_str), long)]
    pub crawler_config: Option<PathBuf>,
    /// Override crawler's user agent
    #[clap(long)]
    pub user_agent: Option<String>,
    /// Override crawler's delay in seconds between two requests
    #[clap(long, conflicts_with_all = &["per-second", "no-throttle"])]
    pub delay: Option<f32>,
    /// Override crawler's maximum number of requests per second
    #[clap(long, conflicts_with = "no-throttle")]
    pub per_second: Option<NonZeroUsize>,
    /// Send requests as fast as possible
    #[clap(long)]
    pub no_throttle: bool,
    /// When quiet no logs are outputted
    #[clap(long, short)]
    pub quiet: bool,
}

impl TryFrom<&CrawlerArgs> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlerArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(file) = args.crawler_config.as_ref().map(fs::File::open) {
            serde_yaml::from_reader(file?)?
        } else {
            CrawlerConfig::default()
        };
        if let Some(user_agent) = &args.user_agent {
            conf.user_agent = user_agent.to_string();
        }
        if let Some(delay) = args.delay {
            anyhow::ensure!(delay >= 0., "Negative delay: {delay}");
            conf.throttle = Some(Throttle::Delay(delay));
        }
        if let Some(per_second) = args.per_second {
            conf.throttle = Some(Throttle::PerSecond(per_second));
        }
        if args.no_throttle {
            conf.throttle = None;
        }
        if let Some(throttle) = conf.throttle {
            throttle.interval()?;
        }
        Ok(conf)
    }
}

#[derive(Debug, clap::Args)]
pub struct OutputArgs {
    /// Path to the output csv file, stdout when absent
    #[clap(parse(from_os_str), long, short)]
    pub output_file: Option<PathBuf>,
    /// What to do when the output file already exists
    #[clap(arg_enum, long)]
    pub file_mode: Option<FileMode>,
    /// How works with several values in list fields are split into rows
    #[clap(arg_enum, long)]
    pub explode: Option<ExplodeMode>,
    /// Text written for values that could not be found, empty by default
    #[clap(long)]
    pub missing_value: Option<String>,
}

impl OutputArgs {
    fn scraper_config(self, seed: Seed) -> WorksScraperConfig {
        WorksScraperConfig {
            csv_file: self.output_file,
            file_mode: self.file_mode.unwrap_or_default(),
            explode: self.explode.unwrap_or_default(),
            missing_value: self.missing_value.unwrap_or_default(),
            ..WorksScraperConfig::new(seed)
        }
    }
}

fn run_crawl(crawler: &CrawlerArgs, scraper_conf: WorksScraperConfig) -> anyhow::Result<()> {
    let crawler_conf = crawler.try_into()?;
    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(crawl_site::<WorksScraper>(&crawler_conf, &scraper_conf))?;
    Ok(())
}

pub fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let seed = Seed::Listing {
        url: args.url,
        start_page: args.start_page,
        page_count: args.pages,
    };
    run_crawl(&args.crawler, args.output.scraper_config(seed))
}

pub fn pages(args: PagesArgs) -> anyhow::Result<()> {
    let seed = Seed::Pages(args.urls);
    run_crawl(&args.crawler, args.output.scraper_config(seed))
}

/// Scrap a single listing page and print the result to stdout
#[derive(Debug, clap::Args)]
#[clap(group = clap::ArgGroup::new("page").required(true))]
pub struct ScrapArgs {
    /// A local html page to scrap
    #[clap(group = "page", parse(from_os_str), long)]
    pub file: Option<PathBuf>,
    /// A distant html page to scrap
    #[clap(group = "page", long)]
    pub url: Option<String>,
    /// Custom user agent to download the page
    #[clap(long, conflicts_with = "file")]
    pub ua: Option<String>,
    /// How works with several values in list fields are split into rows
    #[clap(arg_enum, long)]
    pub explode: Option<ExplodeMode>,
    /// Text written for values that could not be found, empty by default
    #[clap(long)]
    pub missing_value: Option<String>,
}

pub fn scrap(args: ScrapArgs) -> anyhow::Result<()> {
    let (page, location) = if let Some(url) = args.url {
        let mut conf = CrawlerConfig::default();
        if let Some(ua) = args.ua {
            conf.user_agent = ua;
        }
        let fetcher = HttpFetcher::new(&conf)?;
        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        let page = rt.block_on(fetcher.fetch(&url))?;
        (page, PageLocation::Url(url))
    } else if let Some(path) = args.file {
        let page = fs::read_to_string(&path)?;
        (page, PageLocation::Path(path))
    } else {
        anyhow::bail!("Missing `url` or `file`");
    };

    let conf = WorksScraperConfig {
        explode: args.explode.unwrap_or_default(),
        missing_value: args.missing_value.unwrap_or_default(),
        ..WorksScraperConfig::new(Seed::Pages(vec![]))
    };
    scrap_page(&conf, page, location)?;
    Ok(())
}

fn init_logger(quiet: bool) {
    if !quiet {
        env::set_var("RUST_LOG", "ao3meta_crawler=info,ao3meta_scraper=info");
        env_logger::init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Crawl(args) => {
            init_logger(args.crawler.quiet);
            crawl(args)
        }
        SubCommand::Pages(args) => {
            init_logger(args.crawler.quiet);
            pages(args)
        }
        SubCommand::Scrap(args) => {
            env::set_var("RUST_LOG", "ao3meta_crawler=warn,ao3meta_scraper=warn");
            env_logger::init();
            scrap(args)
        }
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "ao3meta", &mut io::stdout());
            Ok(())
        }
    }
}
