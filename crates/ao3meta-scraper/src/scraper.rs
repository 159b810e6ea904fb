use std::path::PathBuf;
use std::{fs, io};

use anyhow::Context;
use ao3meta_crawler::{PageLocation, Scrapable, ScrapingContext, Seed};
use select::document::Document;

use crate::extract;
use crate::table::{ExplodeMode, FlatTable, Table};
use crate::writer::{CsvSink, CsvWriterConfig, FileMode};

#[derive(Debug, Clone)]
pub struct WorksScraperConfig {
    pub seed: Seed,
    /// Written to stdout when `None`
    pub csv_file: Option<PathBuf>,
    pub file_mode: FileMode,
    pub csv_writer: CsvWriterConfig,
    pub explode: ExplodeMode,
    /// How missing values are written out
    pub missing_value: String,
}

impl WorksScraperConfig {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            csv_file: None,
            file_mode: FileMode::default(),
            csv_writer: CsvWriterConfig::default(),
            explode: ExplodeMode::default(),
            missing_value: String::new(),
        }
    }
}

pub struct WorksScraper {
    seed: Seed,
    explode: ExplodeMode,
    sink: CsvSink<Box<dyn io::Write>>,
}

impl Scrapable for WorksScraper {
    type Config = WorksScraperConfig;

    fn new(config: &WorksScraperConfig) -> anyhow::Result<Self> {
        // Checked before the output file gets truncated or created.
        csv::WriterBuilder::try_from(&config.csv_writer)?;

        let out: Box<dyn io::Write> = match &config.csv_file {
            Some(path) => {
                let opts: fs::OpenOptions = config.file_mode.into();
                let file = opts
                    .open(path)
                    .with_context(|| format!("Couldn't open {}", path.display()))?;
                Box::new(file)
            }
            None => Box::new(io::stdout()),
        };

        let sink = CsvSink::new(&config.csv_writer, config.missing_value.as_str(), out)?;
        Ok(Self {
            seed: config.seed.clone(),
            explode: config.explode,
            sink,
        })
    }

    fn seed(&self) -> Seed {
        self.seed.clone()
    }

    fn scrap(&mut self, page: String, ctx: ScrapingContext) -> anyhow::Result<usize> {
        let table = flatten_page(&page, self.explode);
        if table.is_empty() {
            log::warn!("No work found on {:?}", ctx.location());
        }
        let rows = self
            .sink
            .write_page(&table)
            .with_context(|| format!("Couldn't write rows of {:?}", ctx.location()))?;
        Ok(rows)
    }

    fn finalizer(&mut self) {
        if let Err(e) = self.sink.flush() {
            log::error!("Couldn't flush output: {e}");
        }
    }
}

/// Extracts the works of a listing page into flat rows.
pub fn flatten_page(page: &str, explode: ExplodeMode) -> FlatTable {
    let document = Document::from(page);
    let batch = extract::extract_page(&document);
    Table::from(batch).explode(explode)
}

/// Scraps a single page with the given config, ignoring its seed.
pub fn scrap_page(
    config: &WorksScraperConfig,
    page: String,
    location: PageLocation,
) -> anyhow::Result<usize> {
    let mut scraper = WorksScraper::new(config)?;
    let rows = scraper.scrap(page, ScrapingContext::with_location(location))?;
    scraper.finalizer();
    Ok(rows)
}
