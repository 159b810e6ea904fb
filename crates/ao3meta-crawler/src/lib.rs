mod config;
mod crawler;
mod error;
mod fetch;
mod limiter;
pub mod pager;
mod scrapable;

pub use config::{CrawlerConfig, Throttle};
pub use crawler::{crawl_site, crawl_site_with, CrawlSummary};
pub use error::{ConfigError, RangeError, RetrievalError};
pub use fetch::{check_not_empty, Fetcher, HttpFetcher};
pub use limiter::RateLimiter;
pub use scrapable::{PageLocation, Scrapable, ScrapingContext, Seed};

pub use anyhow;
pub use futures;
