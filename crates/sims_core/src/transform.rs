//! Client-side news list pipeline: sort, filter, paginate and keyword
//! extraction over an already fetched collection of article summaries.
//!
//! Every function borrows its input and returns new sequences of references,
//! so the caller's collection is never reordered or mutated.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::stopwords::StopWords;
use crate::types::{ArticleSummary, Sentiment};
use crate::view::{SortDirection, SortKey, ViewState};

pub const PAGE_SIZE: usize = 10;
pub const DEFAULT_KEYWORD_LIMIT: usize = 30;

/// One page of the filtered and sorted list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a> {
    pub rows: Vec<&'a ArticleSummary>,
    pub current_page: usize,
    pub total_pages: usize,
    /// Number of records that matched the filters, across all pages.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Missing values sort below every present value; a missing date comes before
/// any date, pre-1970 ones included.
fn compare(a: &ArticleSummary, b: &ArticleSummary, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Headline => a.headline.cmp(&b.headline),
        SortKey::Source => a.source.cmp(&b.source),
        SortKey::Category => a.category_label().cmp(b.category_label()),
        SortKey::Sentiment => a.sentiment_label().cmp(b.sentiment_label()),
        SortKey::FactCheck => a.fact_check_label().cmp(b.fact_check_label()),
    }
}

/// Stable sort. Equal keys keep their input order in both directions.
pub fn sort<'a, I>(records: I, key: SortKey, direction: SortDirection) -> Vec<&'a ArticleSummary>
where
    I: IntoIterator<Item = &'a ArticleSummary>,
{
    let mut sorted: Vec<_> = records.into_iter().collect();
    match direction {
        SortDirection::Ascending => sorted.sort_by(|a, b| compare(a, b, key)),
        SortDirection::Descending => sorted.sort_by(|a, b| compare(b, a, key)),
    }
    sorted
}

/// Keeps records matching every given predicate, in input order.
pub fn filter<'a, I>(
    records: I,
    category: Option<&str>,
    sentiment: Option<Sentiment>,
    keyword: Option<&str>,
) -> Vec<&'a ArticleSummary>
where
    I: IntoIterator<Item = &'a ArticleSummary>,
{
    let category = category.filter(|c| !c.is_empty());
    let keyword = keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase);

    records
        .into_iter()
        .filter(|record| category.map_or(true, |c| record.category.as_deref() == Some(c)))
        .filter(|record| sentiment.map_or(true, |s| record.sentiment == Some(s)))
        .filter(|record| {
            keyword
                .as_deref()
                .map_or(true, |k| record.headline.to_lowercase().contains(k))
        })
        .collect()
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Slices out page `page_number` (1-based). Pages outside the available
/// range come back empty rather than failing.
pub fn paginate<'a, I>(records: I, page_number: usize, page_size: usize) -> Page<'a>
where
    I: IntoIterator<Item = &'a ArticleSummary>,
{
    let page_size = page_size.max(1);
    let all: Vec<_> = records.into_iter().collect();
    let total = all.len();

    let rows = match page_number.checked_sub(1) {
        Some(index) => all
            .into_iter()
            .skip(index.saturating_mul(page_size))
            .take(page_size)
            .collect(),
        None => Vec::new(),
    };

    Page {
        rows,
        current_page: page_number,
        total_pages: total_pages(total, page_size),
        total,
    }
}

fn tokenize(headline: &str) -> impl Iterator<Item = String> + '_ {
    headline
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

/// Headline word frequencies, most frequent first. Equal counts keep the
/// order in which the words were first seen.
pub fn top_keywords<'a, I>(records: I, stopwords: &StopWords, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a ArticleSummary>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for record in records {
        for token in tokenize(&record.headline) {
            if token.chars().count() <= 2 || stopwords.contains(&token) {
                continue;
            }
            match index.get(&token) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(token.clone(), counts.len());
                    counts.push(KeywordCount { word: token, count: 1 });
                }
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Count of each sentiment present. Records without a sentiment are skipped.
pub fn tone_distribution<'a, I>(records: I) -> BTreeMap<Sentiment, usize>
where
    I: IntoIterator<Item = &'a ArticleSummary>,
{
    let mut tones = BTreeMap::new();
    for sentiment in records.into_iter().filter_map(|r| r.sentiment) {
        *tones.entry(sentiment).or_insert(0) += 1;
    }
    tones
}

/// Distinct non-empty categories, alphabetically.
pub fn category_set<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ArticleSummary>,
{
    records
        .into_iter()
        .filter_map(|r| r.category.as_deref())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// The pipeline bound to one record collection.
#[derive(Debug, Clone, Copy)]
pub struct ListTransformer<'a> {
    records: &'a [ArticleSummary],
    stopwords: &'a StopWords,
}

impl<'a> ListTransformer<'a> {
    pub fn new(records: &'a [ArticleSummary], stopwords: &'a StopWords) -> Self {
        Self { records, stopwords }
    }

    /// Filter, then sort, then cut out the page the view points at.
    pub fn page(&self, view: &ViewState) -> Page<'a> {
        let matching = filter(
            self.records,
            view.category_filter(),
            view.sentiment_filter(),
            view.keyword_filter(),
        );
        let sorted = sort(matching, view.sort_key(), view.sort_direction());
        paginate(sorted, view.page(), view.page_size())
    }

    pub fn top_keywords(&self, limit: usize) -> Vec<KeywordCount> {
        top_keywords(self.records, self.stopwords, limit)
    }

    pub fn categories(&self) -> Vec<String> {
        category_set(self.records)
    }

    pub fn tone(&self) -> BTreeMap<Sentiment, usize> {
        tone_distribution(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{parse_timestamp, ArticleId};
    use crate::view::FilterKind;

    fn article(id: &str, headline: &str, date: Option<&str>) -> ArticleSummary {
        ArticleSummary {
            id: ArticleId::from(id),
            headline: headline.to_string(),
            date: date.and_then(parse_timestamp),
            ..ArticleSummary::default()
        }
    }

    fn ids(rows: &[&ArticleSummary]) -> Vec<String> {
        rows.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn test_sort_by_date_descending() {
        let mut flood = article("1", "Flood warning in Dhaka", Some("2024-06-01"));
        flood.sentiment = Some(Sentiment::Negative);
        let mut markets = article("2", "Markets rally amid reforms", Some("2024-06-03"));
        markets.sentiment = Some(Sentiment::Positive);
        let records = vec![flood, markets];

        let sorted = sort(&records, SortKey::Date, SortDirection::Descending);
        assert_eq!(ids(&sorted), vec!["2", "1"]);
        assert_eq!(records[0].id, ArticleId::from("1"));
    }

    #[test]
    fn test_missing_dates_sort_as_earliest() {
        let records = vec![
            article("a", "x", Some("2024-01-02")),
            article("b", "x", None),
            article("c", "x", Some("1969-12-31")),
        ];
        let asc = sort(&records, SortKey::Date, SortDirection::Ascending);
        assert_eq!(ids(&asc), vec!["b", "c", "a"]);
        let desc = sort(&records, SortKey::Date, SortDirection::Descending);
        assert_eq!(ids(&desc), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_string_sort_is_case_sensitive_with_missing_first() {
        let mut records = vec![
            article("1", "x", None),
            article("2", "x", None),
            article("3", "x", None),
        ];
        records[0].category = Some("economy".into());
        records[1].category = Some("Health".into());
        let sorted = sort(&records, SortKey::Category, SortDirection::Ascending);
        assert_eq!(ids(&sorted), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_sort_keeps_ties_in_input_order() {
        let records = vec![
            article("1", "same", None),
            article("2", "other", None),
            article("3", "same", None),
        ];
        let asc = sort(&records, SortKey::Headline, SortDirection::Ascending);
        assert_eq!(ids(&asc), vec!["2", "1", "3"]);
        let desc = sort(&records, SortKey::Headline, SortDirection::Descending);
        assert_eq!(ids(&desc), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_filter_is_conjunctive_and_order_preserving() {
        let mut records = vec![
            article("1", "Dhaka floods worsen", None),
            article("2", "Cricket final in Dhaka", None),
            article("3", "DHAKA metro opens", None),
        ];
        for r in records.iter_mut() {
            r.category = Some("Health".into());
            r.sentiment = Some(Sentiment::Negative);
        }
        records[1].sentiment = Some(Sentiment::Positive);
        records[2].category = Some("health".into());

        let matched = filter(&records, Some("Health"), Some(Sentiment::Negative), Some("dhaka"));
        assert_eq!(ids(&matched), vec!["1"]);

        let by_keyword = filter(&records, None, None, Some("Dhaka"));
        assert_eq!(ids(&by_keyword), vec!["1", "2", "3"]);

        let everything = filter(&records, Some(""), None, Some("  "));
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn test_filter_without_matching_category_is_empty() {
        let records = vec![article("1", "x", None)];
        assert!(filter(&records, Some("Health"), None, None).is_empty());
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::new(), 1, PAGE_SIZE);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_paginate_bounds() {
        let records: Vec<_> = (0..23).map(|i| article(&i.to_string(), "x", None)).collect();
        let page = paginate(&records, 3, 10);
        assert_eq!(ids(&page.rows), vec!["20", "21", "22"]);
        assert_eq!(page.total_pages, 3);
        assert!(paginate(&records, 4, 10).rows.is_empty());
        assert!(paginate(&records, 0, 10).rows.is_empty());
    }

    #[test]
    fn test_top_keywords_drops_stopwords_and_short_tokens() {
        let records = vec![article("1", "the cat sat", None)];
        let stopwords: StopWords = ["the"].into_iter().collect();
        let keywords = top_keywords(&records, &stopwords, DEFAULT_KEYWORD_LIMIT);
        assert_eq!(
            keywords,
            vec![
                KeywordCount { word: "cat".into(), count: 1 },
                KeywordCount { word: "sat".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_top_keywords_orders_by_count_then_first_seen() {
        let records = vec![
            article("1", "Border talks: India, Bangladesh", None),
            article("2", "Bangladesh border trade up", None),
            article("3", "Trade-deal talks stall; BANGLADESH waits", None),
        ];
        let keywords = top_keywords(&records, &StopWords::empty(), 4);
        let words: Vec<_> = keywords.iter().map(|k| (k.word.as_str(), k.count)).collect();
        assert_eq!(
            words,
            vec![("bangladesh", 3), ("border", 2), ("talks", 2), ("trade", 2)]
        );
    }

    #[test]
    fn test_tone_and_categories_skip_absent_values() {
        let mut records = vec![
            article("1", "x", None),
            article("2", "x", None),
            article("3", "x", None),
        ];
        records[0].sentiment = Some(Sentiment::Negative);
        records[1].sentiment = Some(Sentiment::Negative);
        records[0].category = Some("Politics".into());
        records[2].category = Some("Economy".into());
        records[1].category = Some("Politics".into());

        let tone = tone_distribution(&records);
        assert_eq!(tone.get(&Sentiment::Negative), Some(&2));
        assert_eq!(tone.len(), 1);
        assert_eq!(category_set(&records), vec!["Economy", "Politics"]);
    }

    #[test]
    fn test_transformer_page_applies_view() {
        let mut records: Vec<_> = (1..=15)
            .map(|i| article(&i.to_string(), &format!("Story {:02}", i), Some(format!("2024-06-{:02}", i).as_str())))
            .collect();
        records[14].category = Some("Health".into());
        let stopwords = StopWords::english();
        let transformer = ListTransformer::new(&records, &stopwords);

        let mut view = ViewState::new();
        let first = transformer.page(&view);
        assert_eq!(first.rows.len(), 10);
        assert_eq!(first.rows[0].id, ArticleId::from("15"));
        assert_eq!(first.total_pages, 2);

        view.set_filter(FilterKind::Category, Some("Health")).unwrap();
        let filtered = transformer.page(&view);
        assert_eq!(ids(&filtered.rows), vec!["15"]);
        assert_eq!(filtered.total, 1);
    }
}
