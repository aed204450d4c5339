//! Build-time widget configuration.
//!
//! A WASM bundle has no process environment, so the `CHAT_*` variables are
//! captured by `option_env!` when the bundle is compiled and then parsed by
//! the same loaders the CLI uses at runtime.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use store::{ChatOptions, ConfigError, StoreConfig};

fn build_lookup(var: &str) -> Option<String> {
    let value = match var {
        "CHAT_STORE_URL" => option_env!("CHAT_STORE_URL"),
        "CHAT_STORE_ANON_KEY" => option_env!("CHAT_STORE_ANON_KEY"),
        "CHAT_STORE_SCHEMA" => option_env!("CHAT_STORE_SCHEMA"),
        "CHAT_STORE_TABLE" => option_env!("CHAT_STORE_TABLE"),
        "CHAT_PAGE_SIZE" => option_env!("CHAT_PAGE_SIZE"),
        "CHAT_DEFAULT_NAME" => option_env!("CHAT_DEFAULT_NAME"),
        "CHAT_INIT_POLICY" => option_env!("CHAT_INIT_POLICY"),
        _ => None,
    };
    value.map(str::to_owned)
}

/// Store endpoint baked into this build.
///
/// # Errors
///
/// Returns [`ConfigError`] when the URL or key was missing or malformed at
/// build time.
pub fn store_config() -> Result<StoreConfig, ConfigError> {
    StoreConfig::from_lookup(build_lookup)
}

/// Panel options baked into this build. Invalid values fall back to the
/// defaults with a warning.
pub fn chat_options() -> ChatOptions {
    ChatOptions::from_lookup(build_lookup).unwrap_or_else(|err| {
        log::warn!("ignoring chat options: {err}");
        ChatOptions::default()
    })
}
