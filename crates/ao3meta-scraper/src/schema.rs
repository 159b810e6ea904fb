//! The fixed set of columns every scraped work is described with.

use std::borrow::Cow;
use std::slice;

use lazy_static::lazy_static;

lazy_static! {
    pub static ref WORK_HEADERS: csv::StringRecord =
        Field::ALL.iter().map(|field| field.name()).collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    Author,
    CrossoverFandoms,
    Rating,
    Warning,
    Pairing,
    CompletionStatus,
    DateCompletion,
    FreeformTags,
    AddWarnings,
    Relationships,
    Characters,
    Summary,
    WordCount,
    Chapters,
    Kudos,
    Comments,
    Bookmarks,
    Languages,
    Hits,
}

/// Whether a field holds one value per work or a sequence of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar,
    List,
}

impl Field {
    /// Every field, in output column order.
    pub const ALL: [Field; 21] = [
        Self::Id,
        Self::Title,
        Self::Author,
        Self::CrossoverFandoms,
        Self::Rating,
        Self::Warning,
        Self::Pairing,
        Self::CompletionStatus,
        Self::DateCompletion,
        Self::FreeformTags,
        Self::AddWarnings,
        Self::Relationships,
        Self::Characters,
        Self::Summary,
        Self::WordCount,
        Self::Chapters,
        Self::Kudos,
        Self::Comments,
        Self::Bookmarks,
        Self::Languages,
        Self::Hits,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "ids",
            Self::Title => "titles",
            Self::Author => "authors",
            Self::CrossoverFandoms => "crossover_fandoms",
            Self::Rating => "ratings",
            Self::Warning => "warnings",
            Self::Pairing => "pairings",
            Self::CompletionStatus => "completion_status",
            Self::DateCompletion => "dates_completion",
            Self::FreeformTags => "freeform_tags",
            Self::AddWarnings => "add_warnings",
            Self::Relationships => "relationships",
            Self::Characters => "characters",
            Self::Summary => "summaries",
            Self::WordCount => "word_counts",
            Self::Chapters => "n_chapters",
            Self::Kudos => "n_kudos",
            Self::Comments => "n_comments",
            Self::Bookmarks => "n_bookmarks",
            Self::Languages => "languages",
            Self::Hits => "n_hits",
        }
    }

    pub fn kind(self) -> Kind {
        match self {
            Self::CrossoverFandoms
            | Self::FreeformTags
            | Self::AddWarnings
            | Self::Relationships
            | Self::Characters
            | Self::Languages => Kind::List,
            _ => Kind::Scalar,
        }
    }

    /// Column position of the field.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single extracted value. `Missing` stands for a field that could not be
/// located, which is not the same thing as an empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Missing,
    Text(String),
    Count(u64),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Textual form of the value, `missing` being used for `Value::Missing`.
    pub fn render<'a>(&'a self, missing: &'a str) -> Cow<'a, str> {
        match self {
            Self::Missing => Cow::Borrowed(missing),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Count(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl From<Option<String>> for Value {
    fn from(text: Option<String>) -> Self {
        text.map_or(Self::Missing, Self::Text)
    }
}

impl From<Option<u64>> for Value {
    fn from(count: Option<u64>) -> Self {
        count.map_or(Self::Missing, Self::Count)
    }
}

/// The content of one field for one work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Scalar(Value),
    /// Never empty: a list with nothing located holds a single `Missing`.
    List(Vec<Value>),
}

impl Entry {
    pub fn list(items: Vec<String>) -> Self {
        if items.is_empty() {
            Self::List(vec![Value::Missing])
        } else {
            Self::List(items.into_iter().map(Value::Text).collect())
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Scalar(_) => Kind::Scalar,
            Self::List(_) => Kind::List,
        }
    }

    pub fn values(&self) -> &[Value] {
        match self {
            Self::Scalar(value) => slice::from_ref(value),
            Self::List(values) => values,
        }
    }
}
