pub mod detail;
pub mod error;
pub mod format;
pub mod session;
pub mod source;
pub mod stopwords;
pub mod transform;
pub mod types;
pub mod view;

pub use detail::{ArticleDetail, ArticleList, DetailView, MediaMatch};
pub use error::Error;
pub use session::{DashboardSession, FetchOutcome, FetchTicket};
pub use source::{DashboardSource, MemorySource};
pub use stopwords::StopWords;
pub use transform::{KeywordCount, ListTransformer, Page, DEFAULT_KEYWORD_LIMIT, PAGE_SIZE};
pub use types::{
    ArticleId, ArticleQuery, ArticleSummary, DashboardData, DateRange, FactCheck, Sentiment,
};
pub use view::{FilterKind, SortDirection, SortKey, ViewState};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        ArticleSummary, DashboardData, DashboardSource, Error, ListTransformer, Result,
        Sentiment, ViewState,
    };
}
