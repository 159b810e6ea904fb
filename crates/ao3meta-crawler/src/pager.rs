use std::ops::RangeInclusive;

use select::document::Document;
use select::predicate::{Attr, Class, Name, Predicate};
use url::Url;

use crate::error::RangeError;

const PAGE_PARAM: &str = "page";

/// Highest page number offered by the listing pager, if there is a pager.
pub fn last_page(page: &str) -> Option<usize> {
    let document = Document::from(page);
    let pager = document
        .find(Attr("id", "main").descendant(Name("ol").and(Class("pagination"))))
        .next()?;

    pager
        .find(Name("li"))
        .filter_map(|li| li.text().trim().parse::<usize>().ok())
        .max()
}

/// The inclusive range of pages a crawl will go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    /// Checks the requested pages against the `max` pages available,
    /// defaulting to every page from `start` onward.
    pub fn resolve(start: usize, count: Option<usize>, max: usize) -> Result<Self, RangeError> {
        if start == 0 || start > max {
            return Err(RangeError::StartPage { start, max });
        }
        let end = match count {
            None => max,
            Some(count) => match start.saturating_add(count).checked_sub(1) {
                Some(end) if count > 0 && end <= max => end,
                _ => return Err(RangeError::PageCount { start, count, max }),
            },
        };
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn pages(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Builds the url of any page of a listing from its base url.
///
/// When the base url has no `page` query parameter one is inserted in front
/// of the others, otherwise the existing one gets its value rewritten. The
/// rest of the url is kept verbatim, no re-encoding happens.
#[derive(Debug, Clone)]
pub struct PageUrl {
    head: String,
    params: Vec<String>,
    page_at: Option<usize>,
    fragment: Option<String>,
}

impl PageUrl {
    pub fn parse(base: &str) -> Result<Self, url::ParseError> {
        Url::parse(base)?;

        let (rest, fragment) = match base.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (base, None),
        };
        let (head, query) = rest.split_once('?').unwrap_or((rest, ""));
        let params = query
            .split('&')
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();
        let page_at = params
            .iter()
            .position(|p| p.split('=').next() == Some(PAGE_PARAM));

        Ok(Self {
            head: head.to_string(),
            params,
            page_at,
            fragment,
        })
    }

    pub fn for_page(&self, page: usize) -> String {
        let page_param = format!("{PAGE_PARAM}={page}");
        let mut params = self.params.iter().map(String::as_str).collect::<Vec<_>>();
        match self.page_at {
            Some(i) => params[i] = page_param.as_str(),
            None => params.insert(0, page_param.as_str()),
        }
        let mut url = format!("{}?{}", self.head, params.join("&"));
        if let Some(fragment) = &self.fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}
