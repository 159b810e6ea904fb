use crate::config::Throttle;

/// A listing page could not be obtained. Always fatal for the crawl.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Couldn't reach {url} got: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Couldn't retrieve {url} got status: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("No data retrieved from {url}")]
    Empty { url: String },
}

/// The requested pages fall outside of what the listing offers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("Start page {start} is outside of the {max} pages available")]
    StartPage { start: usize, max: usize },
    #[error("Cannot scrap {count} pages from page {start}, only {max} pages available")]
    PageCount {
        start: usize,
        count: usize,
        max: usize,
    },
}

/// The crawler configuration cannot be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid throttle {throttle:?}: {reason}")]
    Throttle { throttle: Throttle, reason: String },
}
