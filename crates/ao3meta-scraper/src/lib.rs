pub mod extract;
pub mod schema;
mod scraper;
pub mod table;
pub mod writer;

pub use scraper::{flatten_page, scrap_page, WorksScraper, WorksScraperConfig};

pub use ao3meta_crawler;
