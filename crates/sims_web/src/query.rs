use serde::Deserialize;
use sims_core::{DateRange, Error, FilterKind, Result, SortDirection, SortKey, ViewState};

/// Query string of `/api/news`. Everything arrives as text so that bad
/// values become JSON 400 replies instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub category: Option<String>,
    pub sentiment: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl NewsQuery {
    pub fn range(&self) -> Result<DateRange> {
        DateRange::parse(self.start.as_deref(), self.end.as_deref())
    }

    pub fn view(&self) -> Result<ViewState> {
        let mut view = ViewState::new();

        let key = non_blank(&self.sort)
            .map(str::parse::<SortKey>)
            .transpose()?
            .unwrap_or_default();
        let direction = non_blank(&self.dir)
            .map(str::parse::<SortDirection>)
            .transpose()?
            .unwrap_or_default();
        view.set_sort(key, direction);

        view.set_filter(FilterKind::Category, self.category.as_deref())?;
        view.set_filter(FilterKind::Sentiment, self.sentiment.as_deref())?;
        view.set_filter(FilterKind::Keyword, self.keyword.as_deref())?;

        if let Some(page) = non_blank(&self.page) {
            view.set_page(parse_number(page, "page")?);
        }
        Ok(view)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KeywordsQuery {
    pub limit: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl KeywordsQuery {
    pub fn range(&self) -> Result<DateRange> {
        DateRange::parse(self.start.as_deref(), self.end.as_deref())
    }

    pub fn limit(&self, default: usize) -> Result<usize> {
        non_blank(&self.limit)
            .map(|raw| parse_number(raw, "limit"))
            .transpose()
            .map(|limit| limit.unwrap_or(default))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    pub fn range(&self) -> Result<DateRange> {
        DateRange::parse(self.start.as_deref(), self.end.as_deref())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(raw: &str, name: &str) -> Result<usize> {
    raw.parse()
        .map_err(|_| Error::InvalidInput(format!("Invalid {}: {}", name, raw)))
}
