//! # Configuration Module
//!
//! Environment-based configuration for name resolution.
//!
//! ## Overview
//!
//! Only the `request` tag carries options, but the external *name* of a field
//! can also be taken from other tags (for example a `response` or `json` tag
//! shared with serialization code). Which tags are consulted, and in which
//! order, is configuration.
//!
//! ## Environment Variables
//!
//! ### `BRRTBIND_FALLBACK_TAGS`
//!
//! Comma-separated list of tag names checked, in order, when a field's
//! `request` tag provides no name.
//!
//! Default: empty (only the `request` tag and the field identifier are used).
//!
//! ```bash
//! export BRRTBIND_FALLBACK_TAGS=response,json
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use brrtbind::config::BindConfig;
//!
//! let config = BindConfig::from_env();
//! println!("fallback tags: {:?}", config.fallback_tags);
//! ```

use std::env;

/// Environment variable holding the fallback tag list.
pub const FALLBACK_TAGS_ENV: &str = "BRRTBIND_FALLBACK_TAGS";

/// Binder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindConfig {
    /// Tag names checked for a field name after the `request` tag
    pub fallback_tags: Vec<String>,
}

impl BindConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let fallback_tags = match env::var(FALLBACK_TAGS_ENV) {
            Ok(val) => parse_tag_list(&val),
            Err(_) => Vec::new(),
        };
        BindConfig { fallback_tags }
    }

    /// Append a fallback tag, ignoring duplicates.
    #[must_use]
    pub fn with_fallback_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.fallback_tags.contains(&tag) {
            self.fallback_tags.push(tag);
        }
        self
    }
}

fn parse_tag_list(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
