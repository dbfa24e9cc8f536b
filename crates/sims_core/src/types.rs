use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// Opaque article identifier. The upstream API hands out integers, but
/// nothing here depends on that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArticleId(pub String);

impl ArticleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for ArticleId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => ArticleId(n.to_string()),
            Raw::Text(s) => ArticleId(s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Cautious,
}

impl Sentiment {
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Cautious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Cautious => "Cautious",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown sentiment: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactCheck {
    True,
    False,
    Mixed,
    Unverified,
}

impl FactCheck {
    pub const ALL: [FactCheck; 4] = [
        FactCheck::True,
        FactCheck::False,
        FactCheck::Mixed,
        FactCheck::Unverified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactCheck::True => "True",
            FactCheck::False => "False",
            FactCheck::Mixed => "Mixed",
            FactCheck::Unverified => "Unverified",
        }
    }
}

impl fmt::Display for FactCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactCheck {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactCheck::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown fact-check verdict: {}", s)))
    }
}

/// Parses the timestamp shapes the upstream API is known to emit. Anything
/// else is treated as "no date".
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Lenient field deserializers. Upstream records are loosely shaped, so a
/// malformed field degrades to its empty value instead of rejecting the
/// whole record.
pub(crate) mod de {
    use std::str::FromStr;

    use chrono::{DateTime, Utc};
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn non_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
    }

    pub fn label<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        })
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => super::parse_timestamp(&s),
            _ => None,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// `null` or a non-array becomes empty; items that do not parse are skipped.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(Option::<Value>::deserialize(d)?
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default())
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }
}

/// One news item's display fields, as delivered in `latestIndianNews`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    #[serde(default)]
    pub id: ArticleId,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::text")]
    pub headline: String,
    #[serde(default, deserialize_with = "de::text")]
    pub source: String,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::label")]
    pub sentiment: Option<Sentiment>,
    #[serde(
        default,
        rename = "fact_check",
        alias = "factCheck",
        deserialize_with = "de::label"
    )]
    pub fact_check: Option<FactCheck>,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub details_url: Option<String>,
}

impl ArticleSummary {
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    pub fn sentiment_label(&self) -> &str {
        self.sentiment.as_ref().map(Sentiment::as_str).unwrap_or("")
    }

    pub fn fact_check_label(&self) -> &str {
        self.fact_check.as_ref().map(FactCheck::as_str).unwrap_or("")
    }
}

/// Label → count pairs that keep the upstream ordering, so charts list
/// slices the way the API produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution(pub Vec<(String, u64)>);

impl Distribution {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Distribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = Distribution;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of label to count")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Distribution::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((label, value)) = access.next_entry::<String, serde_json::Value>()? {
                    let count = value
                        .as_u64()
                        .or_else(|| value.as_f64().map(|f| f.max(0.0).round() as u64))
                        .unwrap_or(0);
                    entries.push((label, count));
                }
                Ok(Distribution(entries))
            }
        }

        deserializer.deserialize_any(DistributionVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default, deserialize_with = "de::timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::text")]
    pub event: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactChecking {
    pub bangladeshi_agreement: f64,
    pub international_agreement: f64,
    pub verification_status: String,
}

impl FactChecking {
    pub fn has_data(&self) -> bool {
        self.bangladeshi_agreement != 0.0 || self.international_agreement != 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Implication {
    #[serde(rename = "type")]
    pub kind: String,
    pub impact: String,
}

impl Implication {
    pub fn level(&self) -> ImpactLevel {
        match self.impact.as_str() {
            "High" => ImpactLevel::High,
            "Medium" => ImpactLevel::Medium,
            _ => ImpactLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(default, deserialize_with = "de::text")]
    pub category: String,
    #[serde(default, deserialize_with = "de::number")]
    pub likelihood: Option<f64>,
    #[serde(default, deserialize_with = "de::text")]
    pub time_frame: String,
    #[serde(default, deserialize_with = "de::text")]
    pub details: String,
}

/// Everything `/api/dashboard` returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    #[serde(deserialize_with = "de::list")]
    pub latest_indian_news: Vec<ArticleSummary>,
    #[serde(deserialize_with = "de::list")]
    pub timeline_events: Vec<TimelineEvent>,
    pub language_distribution: Distribution,
    pub tone_sentiment: Distribution,
    #[serde(deserialize_with = "de::or_default")]
    pub fact_checking: FactChecking,
    #[serde(deserialize_with = "de::strings")]
    pub key_sources: Vec<String>,
    #[serde(deserialize_with = "de::list")]
    pub implications: Vec<Implication>,
    #[serde(deserialize_with = "de::list")]
    pub predictions: Vec<Prediction>,
}

/// Inclusive calendar-day range sent as `start`/`end` query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Builds a range from raw form values; blank values mean "unbounded".
    pub fn parse(start: Option<&str>, end: Option<&str>) -> crate::Result<Self> {
        fn day(raw: Option<&str>) -> crate::Result<Option<NaiveDate>> {
            match raw.map(str::trim).filter(|s| !s.is_empty()) {
                None => Ok(None),
                Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|_| Error::InvalidInput(format!("Invalid date (expected YYYY-MM-DD): {}", s))),
            }
        }
        Ok(Self::new(day(start)?, day(end)?))
    }

    pub fn contains(&self, date: Option<DateTime<Utc>>) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(day) = date.map(|d| d.date_naive()) else {
            return false;
        };
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(start) = self.start {
            params.push(("start", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            params.push(("end", end.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

/// Parameters of the `/api/articles` listing endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub limit: u32,
    pub offset: u32,
    pub source: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub range: DateRange,
    pub search: Option<String>,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            source: None,
            sentiment: None,
            range: DateRange::default(),
            search: None,
        }
    }
}

impl ArticleQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(source) = &self.source {
            params.push(("source", source.clone()));
        }
        if let Some(sentiment) = self.sentiment {
            params.push(("sentiment", sentiment.to_string()));
        }
        params.extend(self.range.to_params());
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}
