//! Store and controller configuration parsed from key/value lookups.
//!
//! Both the CLI (process environment) and the browser widget (values baked
//! in at build time) read the same keys, so parsing goes through a lookup
//! closure rather than `std::env` directly.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::error::ConfigError;
use crate::model::DEFAULT_AUTHOR_NAME;

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_TABLE: &str = "messages";
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Location and credentials of the hosted message table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Project base URL, without trailing slash.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    pub schema: String,
    pub table: String,
}

impl StoreConfig {
    /// Build a config with the default schema and table.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_owned(),
            anon_key: anon_key.into(),
            schema: DEFAULT_SCHEMA.to_owned(),
            table: DEFAULT_TABLE.to_owned(),
        }
    }

    /// Read store config through `lookup`.
    ///
    /// Required:
    /// - `CHAT_STORE_URL`
    /// - `CHAT_STORE_ANON_KEY`
    ///
    /// Optional:
    /// - `CHAT_STORE_SCHEMA`: default `public`
    /// - `CHAT_STORE_TABLE`: default `messages`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for absent required keys and
    /// [`ConfigError::Invalid`] for a URL without an http(s) scheme.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = required(&lookup, "CHAT_STORE_URL")?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "CHAT_STORE_URL",
                value: url,
                reason: "expected an http:// or https:// URL".to_owned(),
            });
        }
        let anon_key = required(&lookup, "CHAT_STORE_ANON_KEY")?;

        let mut config = Self::new(url, anon_key);
        if let Some(schema) = optional(&lookup, "CHAT_STORE_SCHEMA") {
            config.schema = schema;
        }
        if let Some(table) = optional(&lookup, "CHAT_STORE_TABLE") {
            config.table = table;
        }
        Ok(config)
    }

    /// Read store config from the process environment.
    ///
    /// # Errors
    ///
    /// See [`StoreConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// When the controller performs its first fetch and subscribe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitPolicy {
    /// On mount, whether or not the panel is open.
    #[default]
    Eager,
    /// On the first open of the panel.
    Lazy,
}

/// Tunables for the chat controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub page_size: usize,
    /// Author name used when the composer's name field is blank.
    pub default_name: String,
    pub init_policy: InitPolicy,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_name: DEFAULT_AUTHOR_NAME.to_owned(),
            init_policy: InitPolicy::Eager,
        }
    }
}

impl ChatOptions {
    /// Read controller options through `lookup`; every key is optional.
    ///
    /// - `CHAT_PAGE_SIZE`: default 20, must be at least 1
    /// - `CHAT_DEFAULT_NAME`: default `anonymous`
    /// - `CHAT_INIT_POLICY`: `eager` (default) or `lazy`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if let Some(raw) = optional(&lookup, "CHAT_PAGE_SIZE") {
            options.page_size = parse_page_size(&raw)?;
        }
        if let Some(name) = optional(&lookup, "CHAT_DEFAULT_NAME") {
            options.default_name = name;
        }
        if let Some(raw) = optional(&lookup, "CHAT_INIT_POLICY") {
            options.init_policy = parse_init_policy(&raw)?;
        }
        Ok(options)
    }

    /// Read controller options from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ChatOptions::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String, ConfigError> {
    optional(lookup, var).ok_or(ConfigError::Missing(var))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_page_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            var: "CHAT_PAGE_SIZE",
            value: raw.to_owned(),
            reason: "must be at least 1".to_owned(),
        }),
        Ok(size) => Ok(size),
        Err(err) => Err(ConfigError::Invalid {
            var: "CHAT_PAGE_SIZE",
            value: raw.to_owned(),
            reason: err.to_string(),
        }),
    }
}

fn parse_init_policy(raw: &str) -> Result<InitPolicy, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "eager" => Ok(InitPolicy::Eager),
        "lazy" => Ok(InitPolicy::Lazy),
        _ => Err(ConfigError::Invalid {
            var: "CHAT_INIT_POLICY",
            value: raw.to_owned(),
            reason: "expected 'eager' or 'lazy'".to_owned(),
        }),
    }
}
