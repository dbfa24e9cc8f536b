use std::collections::BTreeMap;

use tracing::debug;

use crate::stopwords::StopWords;
use crate::transform::{KeywordCount, ListTransformer, Page};
use crate::types::{DashboardData, Sentiment};
use crate::view::ViewState;

/// Sequence number handed out when a dashboard fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was started after this one; its result was dropped.
    Stale,
}

/// One dashboard session: the current collection, the view parameters and
/// the bookkeeping that makes overlapping fetches resolve to the latest one.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    data: DashboardData,
    view: ViewState,
    stopwords: StopWords,
    issued: u64,
    resolved: u64,
    loaded: bool,
    error: Option<String>,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new(StopWords::english())
    }
}

impl DashboardSession {
    pub fn new(stopwords: StopWords) -> Self {
        Self {
            data: DashboardData::default(),
            view: ViewState::new(),
            stopwords,
            issued: 0,
            resolved: 0,
            loaded: false,
            error: None,
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// A fetch is outstanding until the latest ticket has been resolved.
    pub fn is_loading(&self) -> bool {
        self.resolved < self.issued
    }

    pub fn complete_fetch(&mut self, ticket: FetchTicket, data: DashboardData) -> FetchOutcome {
        if !self.is_current(ticket) {
            debug!(
                "Dropping stale dashboard result #{} (latest is #{})",
                ticket.0, self.issued
            );
            return FetchOutcome::Stale;
        }
        self.resolved = ticket.0;
        self.data = data;
        self.loaded = true;
        self.error = None;
        self.view.set_page(1);
        FetchOutcome::Applied
    }

    pub fn fail_fetch(&mut self, ticket: FetchTicket, message: impl Into<String>) -> FetchOutcome {
        if !self.is_current(ticket) {
            return FetchOutcome::Stale;
        }
        self.resolved = ticket.0;
        self.error = Some(message.into());
        FetchOutcome::Applied
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn transformer(&self) -> ListTransformer<'_> {
        ListTransformer::new(&self.data.latest_indian_news, &self.stopwords)
    }

    pub fn page(&self) -> Page<'_> {
        self.transformer().page(&self.view)
    }

    pub fn top_keywords(&self, limit: usize) -> Vec<KeywordCount> {
        self.transformer().top_keywords(limit)
    }

    pub fn categories(&self) -> Vec<String> {
        self.transformer().categories()
    }

    pub fn tone(&self) -> BTreeMap<Sentiment, usize> {
        self.transformer().tone()
    }
}
