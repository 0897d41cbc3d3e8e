// src/config/client.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::Language;

pub const ENV_CONFIG_PATH: &str = "BANK_SENTIMENT_CONFIG";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_ERROR_DISPLAY_MS: u64 = 3_000;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_error_display_ms() -> u64 {
    DEFAULT_ERROR_DISPLAY_MS
}
fn default_languages() -> Vec<Language> {
    vec![Language::All, Language::En, Language::Pt]
}
fn default_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig {
            name: "basic".into(),
            path: "/analyze/".into(),
            supports_language: false,
            supports_limit: false,
        },
        VariantConfig {
            name: "extended".into(),
            path: "/analyze/extended/".into(),
            supports_language: true,
            supports_limit: true,
        },
    ]
}

/// One backend analysis strategy and the endpoint path that serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub supports_language: bool,
    #[serde(default)]
    pub supports_limit: bool,
}

/// Static client configuration, handed to the controller once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Deadline for one submission, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// How long an error stays visible before it clears itself.
    #[serde(default = "default_error_display_ms")]
    pub error_display_ms: u64,
    #[serde(default = "default_variants")]
    pub variants: Vec<VariantConfig>,
    #[serde(default)]
    pub default_variant: Option<String>,
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            error_display_ms: DEFAULT_ERROR_DISPLAY_MS,
            variants: default_variants(),
            default_variant: None,
            languages: default_languages(),
        }
    }
}

impl ClientConfig {
    /// Load from an explicit path. TOML or JSON, picked by extension (TOML when unknown).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading client config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: ClientConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON config {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("parsing TOML config {}", path.display()))?,
        };
        cfg.sanitized()
    }

    /// Load using env var + fallbacks:
    /// 1) $BANK_SENTIMENT_CONFIG
    /// 2) config/client.toml
    /// 3) config/client.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/client.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/client.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Self::default().sanitized()
    }

    /// Replace unusable values with defaults and reject what cannot be repaired.
    pub fn sanitized(mut self) -> Result<Self> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url '{}'", self.base_url))?;

        if self.timeout_ms == 0 {
            self.timeout_ms = DEFAULT_TIMEOUT_MS;
        }
        if self.error_display_ms == 0 {
            self.error_display_ms = DEFAULT_ERROR_DISPLAY_MS;
        }
        if self.variants.is_empty() {
            self.variants = default_variants();
        }
        if self.languages.is_empty() {
            self.languages = default_languages();
        }
        let mut seen_languages = HashSet::new();
        self.languages.retain(|l| seen_languages.insert(*l));

        let mut seen_names = HashSet::new();
        for v in &mut self.variants {
            v.name = v.name.trim().to_string();
            if v.name.is_empty() {
                bail!("variant with empty name");
            }
            // Lookup by name is case-insensitive, so names must be too.
            if !seen_names.insert(v.name.to_lowercase()) {
                bail!("variant '{}' is configured more than once", v.name);
            }
            if !v.path.starts_with('/') {
                v.path.insert(0, '/');
            }
        }
        if let Some(name) = self.default_variant.as_deref() {
            if self.variant(name).is_none() {
                bail!("default_variant '{name}' is not among the configured variants");
            }
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }

    pub fn variant(&self, name: &str) -> Option<&VariantConfig> {
        self.variants
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Variant used when a request does not name one.
    pub fn fallback_variant(&self) -> Option<&VariantConfig> {
        self.default_variant
            .as_deref()
            .and_then(|n| self.variant(n))
            .or_else(|| self.variants.first())
    }

    pub fn supports_language(&self, lang: Language) -> bool {
        self.languages.contains(&lang)
    }

    pub fn endpoint_url(&self, variant: &VariantConfig) -> String {
        format!("{}{}", self.base_url, variant.path)
    }
}
