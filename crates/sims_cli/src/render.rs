use std::collections::BTreeMap;

use crossterm::style::{Color, Stylize};
use sims_core::detail::{Coverage, RelatedArticle};
use sims_core::format::{display_link, format_date, format_percent, format_score, truncate_headline};
use sims_core::types::{Distribution, ImpactLevel};
use sims_core::{
    ArticleList, DashboardData, DetailView, KeywordCount, Page, Sentiment, SortKey, ViewState,
};

pub const NO_NEWS: &str = "No news articles found for the selected range.";
pub const NO_EVENTS: &str = "No events found for the selected range.";
pub const NO_FACT_CHECK: &str = "No fact-checking data available.";

const COLUMNS: [(SortKey, &str, usize); 6] = [
    (SortKey::Date, "Date", 13),
    (SortKey::Headline, "Headline", 64),
    (SortKey::Source, "Source", 20),
    (SortKey::Category, "Category", 14),
    (SortKey::Sentiment, "Sentiment", 10),
    (SortKey::FactCheck, "Fact check", 10),
];

/// Plain-text renderings of dashboard data. Colour is only added when the
/// output is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

fn pad(text: &str, width: usize) -> String {
    let cut: String = if text.chars().count() > width {
        text.chars().take(width.saturating_sub(1)).chain(['…']).collect()
    } else {
        text.to_string()
    };
    format!("{:<width$}", cut, width = width)
}

fn sentiment_color(sentiment: Option<Sentiment>) -> Option<Color> {
    match sentiment? {
        Sentiment::Positive => Some(Color::Green),
        Sentiment::Negative => Some(Color::Red),
        Sentiment::Cautious => Some(Color::Yellow),
        Sentiment::Neutral => None,
    }
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: String, color: Option<Color>) -> String {
        match color {
            Some(color) if self.color => text.with(color).to_string(),
            _ => text,
        }
    }

    fn heading(&self, title: &str) -> String {
        if self.color {
            title.bold().to_string()
        } else {
            format!("{}\n{}", title, "=".repeat(title.chars().count()))
        }
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text.to_string(), Some(Color::DarkGrey))
    }

    pub fn news_table(&self, page: &Page<'_>, view: &ViewState) -> String {
        let mut out = String::new();

        let header: Vec<String> = COLUMNS
            .iter()
            .map(|(key, title, width)| {
                let title = if *key == view.sort_key() {
                    format!("{} {}", title, view.sort_direction().arrow())
                } else {
                    title.to_string()
                };
                pad(&title, *width)
            })
            .collect();
        push_line(&mut out, header.join(" ").trim_end());

        if page.rows.is_empty() {
            push_line(&mut out, self.dim(NO_NEWS));
        }
        for row in &page.rows {
            let category = row.category.as_deref().unwrap_or("-");
            let cells = [
                pad(&format_date(row.date), COLUMNS[0].2),
                pad(&truncate_headline(&row.headline), COLUMNS[1].2),
                pad(&row.source, COLUMNS[2].2),
                pad(category, COLUMNS[3].2),
                self.paint(pad(row.sentiment_label(), COLUMNS[4].2), sentiment_color(row.sentiment)),
                pad(row.fact_check_label(), COLUMNS[5].2),
            ];
            push_line(&mut out, cells.join(" ").trim_end());
        }

        let mut footer = format!(
            "Page {} of {} ({} articles)",
            page.current_page, page.total_pages, page.total
        );
        if view.has_filters() {
            footer.push_str(&format!(" | filters: {}", filter_summary(view)));
        }
        push_line(&mut out, self.dim(&footer));
        out
    }

    fn distribution(&self, out: &mut String, distribution: &Distribution, empty: &str) {
        if distribution.is_empty() {
            push_line(out, self.dim(empty));
            return;
        }
        let total = distribution.total();
        let width = distribution.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        for (label, count) in distribution.iter() {
            let percent = format_percent(count, total);
            push_line(out, format!("  {:<width$}  {:>5}  {:>4}", label, count, percent));
        }
    }

    pub fn dashboard(
        &self,
        data: &DashboardData,
        page: &Page<'_>,
        view: &ViewState,
        keywords: &[KeywordCount],
    ) -> String {
        let mut out = String::new();

        push_line(&mut out, self.heading("Latest Indian News"));
        out.push_str(&self.news_table(page, view));

        push_line(&mut out, format!("\n{}", self.heading("Timeline of Key Events")));
        if data.timeline_events.is_empty() {
            push_line(&mut out, self.dim(NO_EVENTS));
        }
        for event in &data.timeline_events {
            push_line(&mut out, format!("  {:<13} {}", format_date(event.date), event.event));
        }

        push_line(&mut out, format!("\n{}", self.heading("Language Press Comparison")));
        self.distribution(&mut out, &data.language_distribution, "No language data available.");

        push_line(&mut out, format!("\n{}", self.heading("Fact-Checking: Cross-Media Comparison")));
        let facts = &data.fact_checking;
        if facts.has_data() {
            let bangladeshi = facts.bangladeshi_agreement;
            let international = facts.international_agreement;
            push_line(&mut out, format!("  Bangladeshi sources    agreement {}", bangladeshi));
            push_line(&mut out, format!("  International sources  agreement {}", international));
            push_line(&mut out, format!("  Verification status: {}", facts.verification_status));
        } else {
            push_line(&mut out, self.dim(NO_FACT_CHECK));
        }

        push_line(&mut out, format!("\n{}", self.heading("Key Sources Used")));
        if data.key_sources.is_empty() {
            push_line(&mut out, self.dim("No sources found."));
        }
        for source in &data.key_sources {
            push_line(&mut out, format!("  - {}", display_link(source)));
        }

        push_line(&mut out, format!("\n{}", self.heading("Tone/Sentiment Analysis")));
        self.distribution(&mut out, &data.tone_sentiment, "No sentiment data available.");

        push_line(&mut out, format!("\n{}", self.heading("Implications & Analysis")));
        if data.implications.is_empty() {
            push_line(&mut out, self.dim("No implications found."));
        }
        for implication in &data.implications {
            let color = match implication.level() {
                ImpactLevel::High => Color::Red,
                ImpactLevel::Medium => Color::Yellow,
                ImpactLevel::Low => Color::Green,
            };
            let kind = self.paint(implication.kind.clone(), Some(color));
            push_line(&mut out, format!("  {}  {} Impact", kind, implication.impact));
        }

        push_line(&mut out, format!("\n{}", self.heading("Prediction (Outlook)")));
        if data.predictions.is_empty() {
            push_line(&mut out, self.dim("No predictions found."));
        }
        for prediction in &data.predictions {
            let likelihood = prediction
                .likelihood
                .map(|l| format!("{}%", l))
                .unwrap_or_else(|| "-".to_string());
            push_line(&mut out, format!("  {}", prediction.category));
            push_line(
                &mut out,
                format!("    Likelihood: {}  Time frame: {}", likelihood, prediction.time_frame),
            );
            if !prediction.details.is_empty() {
                push_line(&mut out, format!("    {}", prediction.details));
            }
        }

        push_line(&mut out, format!("\n{}", self.heading("Top Keywords")));
        out.push_str(&self.keywords(keywords));
        out
    }

    pub fn keywords(&self, keywords: &[KeywordCount]) -> String {
        if keywords.is_empty() {
            return format!("{}\n", self.dim("No keywords found."));
        }
        let width = keywords.iter().map(|k| k.word.chars().count()).max().unwrap_or(0);
        keywords
            .iter()
            .map(|k| format!("  {:<width$}  {}\n", k.word, k.count, width = width))
            .collect()
    }

    pub fn categories(&self, categories: &[String]) -> String {
        if categories.is_empty() {
            return format!("{}\n", self.dim("No categories found."));
        }
        categories.iter().map(|c| format!("  {}\n", c)).collect()
    }

    pub fn tone(&self, tone: &BTreeMap<Sentiment, usize>) -> String {
        if tone.is_empty() {
            return format!("{}\n", self.dim("No sentiment data available."));
        }
        let total: usize = tone.values().sum();
        tone.iter()
            .map(|(sentiment, count)| {
                let label = self.paint(pad(sentiment.as_str(), 10), sentiment_color(Some(*sentiment)));
                format!(
                    "  {} {:>5}  {:>4}\n",
                    label,
                    count,
                    format_percent(*count as u64, total as u64)
                )
            })
            .collect()
    }

    fn coverage(&self, out: &mut String, title: &str, coverage: &Coverage) {
        push_line(out, format!("\n{}", self.heading(title)));
        push_line(out, format!("  {}", coverage.summary));
        for m in &coverage.matches {
            let link = m.url.as_deref().map(display_link).unwrap_or_default();
            push_line(out, format!("  - {} ({}) {}", m.title, m.source, self.dim(&link)));
        }
    }

    fn related(&self, out: &mut String, title: &str, articles: &[RelatedArticle], empty: &str) {
        push_line(out, format!("\n{}", self.heading(title)));
        if articles.is_empty() {
            push_line(out, self.dim(empty));
        }
        for article in articles {
            let title = truncate_headline(&article.title);
            push_line(out, format!("  [{}] {} ({})", article.id, title, article.source));
        }
    }

    pub fn article(&self, view: &DetailView) -> String {
        let mut out = String::new();
        push_line(&mut out, self.heading(&view.title));
        push_line(
            &mut out,
            format!(
                "{} | {} | {} | {}",
                view.category,
                view.source,
                view.author,
                format_date(view.published_date)
            ),
        );
        let color = sentiment_color(Some(view.sentiment));
        let sentiment = self.paint(view.sentiment.to_string(), color);
        push_line(&mut out, format!("Sentiment: {}  Fact check: {}", sentiment, view.fact_check));
        if let Some(url) = &view.url {
            push_line(&mut out, url);
        }
        if !view.links.is_empty() {
            let links: Vec<String> = view.links.iter().map(|l| display_link(l)).collect();
            push_line(&mut out, format!("Links: {}", links.join(", ")));
        }

        push_line(&mut out, format!("\n{}", self.heading("Executive Summary")));
        push_line(&mut out, view.text.as_deref().unwrap_or("-"));

        self.coverage(&mut out, "Bangladeshi Media Summary", &view.bangladeshi);
        self.coverage(&mut out, "International Media Summary", &view.international);

        push_line(&mut out, format!("\nScore: {}", format_score(view.score)));

        if let Some(related) = &view.related_articles {
            self.related(&mut out, "Related Articles", related, "No related articles found.");
        }
        self.related(
            &mut out,
            &format!("More from {}", view.source),
            &view.more_from_source,
            "No more articles from this source.",
        );
        out
    }

    pub fn article_list(&self, list: &ArticleList, offset: u32) -> String {
        let mut out = String::new();
        if list.results.is_empty() {
            push_line(&mut out, self.dim("No articles found."));
        }
        for article in &list.results {
            let sentiment = article.sentiment.map(|s| s.to_string()).unwrap_or_default();
            push_line(
                &mut out,
                format!(
                    "{:>8}  {:<13} {} {} {}",
                    article.id,
                    format_date(article.published_date),
                    pad(&truncate_headline(&article.title), COLUMNS[1].2),
                    pad(&article.source, COLUMNS[2].2),
                    self.paint(sentiment, sentiment_color(article.sentiment))
                ),
            );
        }
        let first = if list.count == 0 { 0 } else { offset as u64 + 1 };
        let last = offset as u64 + list.count;
        push_line(&mut out, self.dim(&format!("Showing {}-{} of {}", first, last, list.total)));
        out
    }
}

fn filter_summary(view: &ViewState) -> String {
    let mut parts = Vec::new();
    if let Some(category) = view.category_filter() {
        parts.push(format!("category={}", category));
    }
    if let Some(sentiment) = view.sentiment_filter() {
        parts.push(format!("sentiment={}", sentiment));
    }
    if let Some(keyword) = view.keyword_filter() {
        parts.push(format!("keyword={}", keyword));
    }
    parts.join(", ")
}
