use chrono::{DateTime, Utc};

pub const HEADLINE_MAX_CHARS: usize = 60;
pub const LINK_MAX_CHARS: usize = 40;
const ELLIPSIS: &str = "...";

fn truncate_chars(text: &str, keep: usize) -> String {
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Headlines longer than 60 characters are cut and suffixed with `...`.
pub fn truncate_headline(headline: &str) -> String {
    if headline.chars().count() > HEADLINE_MAX_CHARS {
        truncate_chars(headline, HEADLINE_MAX_CHARS)
    } else {
        headline.to_string()
    }
}

/// Short form of a link for inline display: no scheme, no trailing slash,
/// at most 40 characters.
pub fn display_link(url: &str) -> String {
    let bare = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let bare = bare.strip_suffix('/').unwrap_or(bare);
    if bare.chars().count() > LINK_MAX_CHARS {
        truncate_chars(bare, LINK_MAX_CHARS - ELLIPSIS.len())
    } else {
        bare.to_string()
    }
}

/// `Jun 1, 2024`, or `-` when there is no date.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_score(score: Option<f64>) -> String {
    score
        .filter(|s| s.is_finite())
        .map(|s| format!("{:.3}", s))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.0}%", part as f64 * 100.0 / total as f64)
}
