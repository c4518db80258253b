//! Paper data model as returned by the recommendation service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Summaries longer than this many characters are collapsed by default.
pub const SUMMARY_PREVIEW_CHARS: usize = 150;

/// Publication year. The service may send either a string or a number; the
/// original form is kept so a saved paper round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaperYear {
    Number(i64),
    Text(String),
}

impl fmt::Display for PaperYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperYear::Number(year) => write!(f, "{}", year),
            PaperYear::Text(year) => write!(f, "{}", year),
        }
    }
}

/// A recommended paper.
///
/// Papers are immutable once received. Two papers are the same saved entity
/// when their titles are equal, see [`Paper::identity_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Comma-separated topic tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<PaperYear>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Paper {
    /// Create a paper with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: None,
            summary: None,
            terms: None,
            year: None,
            url: None,
        }
    }

    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }

    pub fn with_year(mut self, year: PaperYear) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Key used for saved-collection membership. Title only: two distinct
    /// papers sharing a title collide.
    pub fn identity_key(&self) -> &str {
        &self.title
    }

    /// Whether `other` is the same saved entity as `self`.
    pub fn same_identity(&self, other: &Paper) -> bool {
        self.identity_key() == other.identity_key()
    }

    /// Split `terms` into trimmed, non-empty tags.
    pub fn term_tags(&self) -> Vec<&str> {
        match &self.terms {
            Some(terms) => terms
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether the summary is long enough to be collapsible.
    pub fn has_long_summary(&self, limit: usize) -> bool {
        self.summary
            .as_deref()
            .is_some_and(|s| s.chars().count() > limit)
    }

    /// The summary cut to `limit` characters, with an ellipsis when cut.
    pub fn summary_preview(&self, limit: usize) -> Option<String> {
        let summary = self.summary.as_deref()?;
        if summary.chars().count() <= limit {
            return Some(summary.to_string());
        }
        let mut preview: String = summary.chars().take(limit).collect();
        preview.truncate(preview.trim_end().len());
        preview.push_str("...");
        Some(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_minimal() {
        let paper: Paper = serde_json::from_str(r#"{"title":"Attention"}"#).unwrap();
        assert_eq!(paper, Paper::new("Attention"));
    }

    #[test]
    fn test_deserialize_year_number_and_string() {
        let a: Paper = serde_json::from_str(r#"{"title":"A","year":2017}"#).unwrap();
        let b: Paper = serde_json::from_str(r#"{"title":"B","year":"2017"}"#).unwrap();
        assert_eq!(a.year, Some(PaperYear::Number(2017)));
        assert_eq!(b.year, Some(PaperYear::Text("2017".into())));
        assert_eq!(a.year.unwrap().to_string(), "2017");
        assert_eq!(b.year.unwrap().to_string(), "2017");
    }

    #[test]
    fn test_serialize_skips_missing_fields() {
        let paper = Paper::new("Only title").with_terms("cs.AI");
        let json = serde_json::to_string(&paper).unwrap();
        assert_eq!(json, r#"{"title":"Only title","terms":"cs.AI"}"#);
    }

    #[test]
    fn test_year_keeps_original_form() {
        let paper: Paper = serde_json::from_str(r#"{"title":"A","year":"2020"}"#).unwrap();
        let json = serde_json::to_string(&paper).unwrap();
        assert!(json.contains(r#""year":"2020""#));
    }

    #[test]
    fn test_term_tags() {
        let paper = Paper::new("T").with_terms("cs.LG, stat.ML ,, cs.AI");
        assert_eq!(paper.term_tags(), vec!["cs.LG", "stat.ML", "cs.AI"]);
        assert!(Paper::new("T").term_tags().is_empty());
    }

    #[test]
    fn test_identity_is_title_only() {
        let a = Paper::new("Same").with_authors("Alice");
        let b = Paper::new("Same").with_authors("Bob").with_year(PaperYear::Number(1999));
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&Paper::new("same")));
    }

    #[test]
    fn test_summary_preview() {
        let short = Paper::new("S").with_summary("short summary");
        assert!(!short.has_long_summary(SUMMARY_PREVIEW_CHARS));
        assert_eq!(
            short.summary_preview(SUMMARY_PREVIEW_CHARS).as_deref(),
            Some("short summary")
        );

        let long = Paper::new("L").with_summary("word ".repeat(40));
        assert!(long.has_long_summary(SUMMARY_PREVIEW_CHARS));
        let preview = long.summary_preview(SUMMARY_PREVIEW_CHARS).unwrap();
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= SUMMARY_PREVIEW_CHARS + 3);

        assert!(Paper::new("N").summary_preview(10).is_none());
    }
}
