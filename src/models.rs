//! Data models for extracted news articles.
//!
//! This module defines the structures the extractor produces:
//! - [`NewsArticle`]: one news item as surfaced to the rendering layer
//! - [`Reliability`]: the closed set of rating labels with their sort ranks
//! - [`LocalizedText`]: per-language text with an explicit default-language
//!   fallback
//!
//! Records serialize with camelCase field names to match the JSON shape the
//! frontend consumes (`translatedTitles`, `imageUrl`, `searchText`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language code every localized lookup falls back to.
pub const DEFAULT_LANGUAGE: &str = "ko";

/// Placeholder destination used when an article block carries no usable href.
pub const PLACEHOLDER_LINK: &str = "#";

/// Sentinel used when the publisher name cannot be parsed from the header.
pub const UNKNOWN_SOURCE: &str = "알 수 없음";

/// Reliability rating attached to an article by the upstream evaluation
/// pipeline.
///
/// The rating is parsed from the Korean annotation `신뢰도: 높음/보통/낮음`
/// embedded in the summary markup. Articles without an annotation are
/// `Unknown`, which sorts last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl Reliability {
    /// Sort rank for the output ordering. Higher ranks sort first.
    pub fn rank(self) -> u8 {
        match self {
            Reliability::High => 3,
            Reliability::Medium => 2,
            Reliability::Low => 1,
            Reliability::Unknown => 0,
        }
    }

    /// Map a Korean rating label to its variant.
    ///
    /// Anything outside the closed label set becomes [`Reliability::Unknown`].
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "높음" => Reliability::High,
            "보통" => Reliability::Medium,
            "낮음" => Reliability::Low,
            _ => Reliability::Unknown,
        }
    }
}

/// Per-language text keyed by language code.
///
/// The archive carries titles and summaries in up to five languages
/// (`ko`, `en`, `ja`, `zh-Hans`, `fr`). Lookups go through [`resolve`],
/// which falls back to [`DEFAULT_LANGUAGE`] when the requested language is
/// missing, so the fallback is visible and testable rather than an implicit
/// property access.
///
/// [`resolve`]: LocalizedText::resolve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText {
    texts: BTreeMap<String, String>,
}

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a single-language value stored under [`DEFAULT_LANGUAGE`].
    pub fn single(text: impl Into<String>) -> Self {
        let mut localized = Self::new();
        localized.insert(DEFAULT_LANGUAGE, text);
        localized
    }

    pub fn insert(&mut self, language: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(language.into(), text.into());
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.texts.get(language).map(String::as_str)
    }

    /// Lookup with the mandatory default-language fallback.
    ///
    /// Returns the empty string only when the value holds no text at all.
    pub fn resolve(&self, language: &str) -> &str {
        self.get(language)
            .or_else(|| self.get(DEFAULT_LANGUAGE))
            .unwrap_or("")
    }

    /// True when no language holds any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.texts.values().all(|text| text.trim().is_empty())
    }
}

/// One news item recovered from the HTML archive.
///
/// Records are constructed fresh on every extraction pass and are immutable
/// once produced; `title` and `summary` hold the display-language text
/// resolved from the translation maps (see [`NewsArticle::localize`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    /// Category label, taken from the containing directory name.
    pub category: String,
    /// Finer-grained label derived from the archive file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    /// Display title in the resolved language.
    pub title: String,
    /// Title per language code.
    pub translated_titles: LocalizedText,
    /// Display summary in the resolved language, reliability annotation
    /// stripped.
    pub summary: String,
    /// Summary per language code.
    pub translated_summaries: LocalizedText,
    /// Destination URL; [`PLACEHOLDER_LINK`] when the markup carried none.
    pub link: String,
    /// Publishing outlet, or [`UNKNOWN_SOURCE`] when unparseable.
    pub source: String,
    /// Publication time as an ISO-8601 string (`%Y-%m-%dT%H:%M:%S`).
    pub date: String,
    pub reliability: Reliability,
    /// Optional thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Lowercased `"{title} {summary} {source}"` blob for downstream search.
    #[serde(default)]
    pub search_text: String,
}

impl NewsArticle {
    /// Re-resolve the flat `title`/`summary` fields for a display language.
    ///
    /// Languages without a translation fall back to the default-language
    /// text; the translation maps themselves are left untouched.
    pub fn localize(&mut self, language: &str) {
        self.title = self.translated_titles.resolve(language).to_string();
        self.summary = self.translated_summaries.resolve(language).to_string();
    }
}
