// src/model.rs
//! Request/response types: what a submission carries, what the service returns,
//! and the normalized article records the sorter works on.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub const MIN_RESULT_LIMIT: u32 = 1;
pub const MAX_RESULT_LIMIT: u32 = 100;
pub const DEFAULT_RESULT_LIMIT: u32 = 10;

/// News language filter offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    All,
    En,
    Pt,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::All => "all",
            Language::En => "en",
            Language::Pt => "pt",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Language::All),
            "en" => Ok(Language::En),
            "pt" => Ok(Language::Pt),
            other => Err(format!("unknown language '{other}' (expected all, en or pt)")),
        }
    }
}

/// One submission, built fresh from the form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub subject: String,
    pub language: Language,
    pub result_limit: u32,
    /// Backend strategy by name; `None` uses the configured default.
    pub variant: Option<String>,
}

impl AnalysisRequest {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            language: Language::All,
            result_limit: DEFAULT_RESULT_LIMIT,
            variant: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.result_limit = limit;
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }
}

/// POST body sent to the analysis service. Optional fields are only present for
/// variants that accept them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    pub bank_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// `score` as it arrives: number, numeric string, or something unusable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireScore {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl WireScore {
    /// Normalize to a finite number; anything else counts as missing.
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            WireScore::Number(n) => *n,
            WireScore::Text(s) => s.trim().parse::<f64>().ok()?,
            WireScore::Other(_) => return None,
        };
        n.is_finite().then_some(n)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub score: Option<WireScore>,
}

/// Either shape the service may answer a 2xx with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ServicePayload {
    Failure { error: String },
    Articles(Vec<WireArticle>),
}

/// Normalized article row. `None` means the field was missing or null on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: Option<String>,
    pub url: Option<String>,
    pub sentiment: Option<String>,
    pub score: Option<f64>,
}

impl From<WireArticle> for Article {
    fn from(w: WireArticle) -> Self {
        Self {
            title: w.title,
            url: w.url,
            sentiment: w.sentiment,
            score: w.score.as_ref().and_then(WireScore::to_number),
        }
    }
}

impl Article {
    /// Score as shown in the table: three decimals, or `N/A`.
    pub fn score_display(&self) -> String {
        match self.score {
            Some(s) => format!("{s:.3}"),
            None => "N/A".to_string(),
        }
    }
}

/// Articles in server order. Shared, never mutated after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    articles: Arc<[Article]>,
}

impl ResultSet {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles: articles.into(),
        }
    }

    pub fn from_wire(items: Vec<WireArticle>) -> Self {
        Self::new(items.into_iter().map(Article::from).collect())
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
