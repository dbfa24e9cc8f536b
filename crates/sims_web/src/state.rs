use std::sync::Arc;

use sims_core::{DashboardSource, StopWords, DEFAULT_KEYWORD_LIMIT};

pub struct AppState {
    pub source: Arc<dyn DashboardSource>,
    pub stopwords: StopWords,
    /// Used when `/api/news/keywords` is called without `limit`.
    pub keyword_limit: usize,
}

impl AppState {
    pub fn new(source: Arc<dyn DashboardSource>) -> Self {
        Self {
            source,
            stopwords: StopWords::english(),
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }

    pub fn with_keyword_limit(mut self, limit: usize) -> Self {
        self.keyword_limit = limit;
        self
    }

    pub fn with_stopwords(mut self, stopwords: StopWords) -> Self {
        self.stopwords = stopwords;
        self
    }
}
