use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transform::PAGE_SIZE;
use crate::types::Sentiment;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Headline,
    Source,
    Category,
    Sentiment,
    FactCheck,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Headline => "headline",
            SortKey::Source => "source",
            SortKey::Category => "category",
            SortKey::Sentiment => "sentiment",
            SortKey::FactCheck => "fact_check",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "headline" => Ok(SortKey::Headline),
            "source" => Ok(SortKey::Source),
            "category" => Ok(SortKey::Category),
            "sentiment" => Ok(SortKey::Sentiment),
            "fact_check" | "factcheck" | "fact-check" => Ok(SortKey::FactCheck),
            other => Err(Error::InvalidInput(format!("Unknown sort key: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        })
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(Error::InvalidInput(format!("Unknown sort direction: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Category,
    Sentiment,
    Keyword,
}

impl FromStr for FilterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "category" => Ok(FilterKind::Category),
            "sentiment" => Ok(FilterKind::Sentiment),
            "keyword" | "search" => Ok(FilterKind::Keyword),
            other => Err(Error::InvalidInput(format!("Unknown filter: {}", other))),
        }
    }
}

/// Sort, filter and page parameters of one dashboard session.
///
/// Fields are only reachable through the setters so that the "back to page
/// one on any sort or filter change" rule cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    sort_key: SortKey,
    sort_direction: SortDirection,
    category: Option<String>,
    sentiment: Option<Sentiment>,
    keyword: Option<String>,
    page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            category: None,
            sentiment: None,
            keyword: None,
            page: 1,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn sentiment_filter(&self) -> Option<Sentiment> {
        self.sentiment
    }

    pub fn keyword_filter(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        PAGE_SIZE
    }

    pub fn has_filters(&self) -> bool {
        self.category.is_some() || self.sentiment.is_some() || self.keyword.is_some()
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        if self.sort_key != key || self.sort_direction != direction {
            self.sort_key = key;
            self.sort_direction = direction;
            self.page = 1;
        }
    }

    /// Column-header click: the active column flips direction, any other
    /// column becomes active in ascending order.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.set_sort(key, self.sort_direction.reversed());
        } else {
            self.set_sort(key, SortDirection::Ascending);
        }
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        let category = category.filter(|c| !c.trim().is_empty());
        if self.category != category {
            self.category = category;
            self.page = 1;
        }
    }

    pub fn set_sentiment_filter(&mut self, sentiment: Option<Sentiment>) {
        if self.sentiment != sentiment {
            self.sentiment = sentiment;
            self.page = 1;
        }
    }

    pub fn set_keyword_filter(&mut self, keyword: Option<String>) {
        let keyword = keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if self.keyword != keyword {
            self.keyword = keyword;
            self.page = 1;
        }
    }

    /// Sets a filter from raw user text. `None` or blank text clears it.
    pub fn set_filter(&mut self, kind: FilterKind, value: Option<&str>) -> Result<()> {
        let value = value.filter(|v| !v.trim().is_empty());
        match kind {
            FilterKind::Category => self.set_category_filter(value.map(str::to_string)),
            FilterKind::Sentiment => {
                let sentiment = value.map(str::parse::<Sentiment>).transpose()?;
                self.set_sentiment_filter(sentiment);
            }
            FilterKind::Keyword => self.set_keyword_filter(value.map(str::to_string)),
        }
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.set_category_filter(None);
        self.set_sentiment_filter(None);
        self.set_keyword_filter(None);
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }
}
