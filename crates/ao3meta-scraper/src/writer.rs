use std::borrow::Cow;
use std::{fs, io};

#[cfg(feature = "clap")]
use clap::ArgEnum;
use serde::{Deserialize, Serialize};

use crate::schema::WORK_HEADERS;
use crate::table::FlatTable;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CsvWriterConfig {
    #[serde(default = "default_csv_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub escape: Option<char>,
    #[serde(default = "default_csv_terminator")]
    pub terminator: CsvTerminator,
}

impl Default for CsvWriterConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            escape: None,
            terminator: CsvTerminator::Any('\n'),
        }
    }
}

fn default_csv_delimiter() -> char {
    CsvWriterConfig::default().delimiter
}

fn default_csv_terminator() -> CsvTerminator {
    CsvWriterConfig::default().terminator
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CsvTerminator {
    CRLF,
    Any(char),
}

/// The csv writer only deals with single byte separators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Csv {role} must be an ASCII character, got {found:?}")]
pub struct NonAsciiChar {
    pub role: &'static str,
    pub found: char,
}

fn ascii(role: &'static str, found: char) -> Result<u8, NonAsciiChar> {
    u8::try_from(found)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(NonAsciiChar { role, found })
}

impl TryFrom<CsvTerminator> for csv::Terminator {
    type Error = NonAsciiChar;

    fn try_from(source: CsvTerminator) -> Result<Self, Self::Error> {
        match source {
            CsvTerminator::CRLF => Ok(Self::CRLF),
            CsvTerminator::Any(c) => Ok(Self::Any(ascii("terminator", c)?)),
        }
    }
}

impl TryFrom<&CsvWriterConfig> for csv::WriterBuilder {
    type Error = NonAsciiChar;

    fn try_from(c: &CsvWriterConfig) -> Result<Self, Self::Error> {
        let mut builder = csv::WriterBuilder::new();
        builder.delimiter(ascii("delimiter", c.delimiter)?);
        builder.terminator(c.terminator.try_into()?);
        // The header is written by hand, once per run.
        builder.has_headers(false);
        match c.escape {
            Some(escape) => builder.double_quote(false).escape(ascii("escape", escape)?),
            None => builder.double_quote(true),
        };
        Ok(builder)
    }
}

/// How an existing output file is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(ArgEnum))]
#[serde(rename_all = "kebab-case")]
pub enum FileMode {
    /// Keep its content and write after it
    #[default]
    Append,
    /// Replace its content
    Truncate,
    /// Refuse to write to it
    CreateNew,
}

impl From<FileMode> for fs::OpenOptions {
    fn from(mode: FileMode) -> Self {
        let mut opts = fs::OpenOptions::new();
        match mode {
            FileMode::Append => opts.create(true).append(true),
            FileMode::Truncate => opts.create(true).write(true).truncate(true),
            FileMode::CreateNew => opts.create_new(true).write(true),
        };
        opts
    }
}

/// Appends flattened pages to a csv output, the header going first and only
/// once for the lifetime of the sink.
pub struct CsvSink<W: io::Write> {
    wtr: csv::Writer<W>,
    missing: String,
    header_written: bool,
}

impl<W: io::Write> CsvSink<W> {
    pub fn new(
        config: &CsvWriterConfig,
        missing: impl Into<String>,
        out: W,
    ) -> Result<Self, NonAsciiChar> {
        Ok(Self {
            wtr: csv::WriterBuilder::try_from(config)?.from_writer(out),
            missing: missing.into(),
            header_written: false,
        })
    }

    /// Writes and flushes the rows of one page, returning how many there were.
    pub fn write_page(&mut self, table: &FlatTable) -> csv::Result<usize> {
        if !self.header_written {
            self.wtr.write_record(&*WORK_HEADERS)?;
            self.header_written = true;
        }
        for row in table.rows() {
            let cells = row
                .iter()
                .map(|value| value.render(&self.missing))
                .collect::<Vec<Cow<str>>>();
            self.wtr.write_record(cells.iter().map(|c| c.as_bytes()))?;
        }
        self.wtr.flush()?;
        Ok(table.len())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.wtr.flush()
    }
}
