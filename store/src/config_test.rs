use super::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

// =============================================================
// StoreConfig
// =============================================================

#[test]
fn store_config_reads_required_keys_and_defaults() {
    let cfg = StoreConfig::from_lookup(lookup(&[
        ("CHAT_STORE_URL", "https://demo.supabase.co/"),
        ("CHAT_STORE_ANON_KEY", "anon"),
    ]))
    .unwrap();
    assert_eq!(cfg.url, "https://demo.supabase.co");
    assert_eq!(cfg.anon_key, "anon");
    assert_eq!(cfg.schema, DEFAULT_SCHEMA);
    assert_eq!(cfg.table, DEFAULT_TABLE);
}

#[test]
fn store_config_applies_overrides() {
    let cfg = StoreConfig::from_lookup(lookup(&[
        ("CHAT_STORE_URL", "http://localhost:54321"),
        ("CHAT_STORE_ANON_KEY", "anon"),
        ("CHAT_STORE_SCHEMA", "chat"),
        ("CHAT_STORE_TABLE", "lobby"),
    ]))
    .unwrap();
    assert_eq!(cfg.schema, "chat");
    assert_eq!(cfg.table, "lobby");
}

#[test]
fn store_config_requires_url() {
    let err = StoreConfig::from_lookup(lookup(&[("CHAT_STORE_ANON_KEY", "anon")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("CHAT_STORE_URL"));
}

#[test]
fn store_config_treats_blank_key_as_missing() {
    let err = StoreConfig::from_lookup(lookup(&[
        ("CHAT_STORE_URL", "https://demo.supabase.co"),
        ("CHAT_STORE_ANON_KEY", "   "),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::Missing("CHAT_STORE_ANON_KEY"));
}

#[test]
fn store_config_rejects_url_without_scheme() {
    let err = StoreConfig::from_lookup(lookup(&[
        ("CHAT_STORE_URL", "demo.supabase.co"),
        ("CHAT_STORE_ANON_KEY", "anon"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "CHAT_STORE_URL", .. }));
}

// =============================================================
// ChatOptions
// =============================================================

#[test]
fn chat_options_defaults() {
    let options = ChatOptions::from_lookup(lookup(&[])).unwrap();
    assert_eq!(options, ChatOptions::default());
    assert_eq!(options.page_size, 20);
    assert_eq!(options.default_name, "anonymous");
    assert_eq!(options.init_policy, InitPolicy::Eager);
}

#[test]
fn chat_options_parses_overrides() {
    let options = ChatOptions::from_lookup(lookup(&[
        ("CHAT_PAGE_SIZE", "50"),
        ("CHAT_DEFAULT_NAME", "guest"),
        ("CHAT_INIT_POLICY", "LAZY"),
    ]))
    .unwrap();
    assert_eq!(options.page_size, 50);
    assert_eq!(options.default_name, "guest");
    assert_eq!(options.init_policy, InitPolicy::Lazy);
}

#[test]
fn chat_options_rejects_zero_page_size() {
    let err = ChatOptions::from_lookup(lookup(&[("CHAT_PAGE_SIZE", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "CHAT_PAGE_SIZE", .. }));
}

#[test]
fn chat_options_rejects_unknown_policy() {
    let err = ChatOptions::from_lookup(lookup(&[("CHAT_INIT_POLICY", "sometimes")])).unwrap_err();
    assert_eq!(err.to_string(), "invalid CHAT_INIT_POLICY='sometimes': expected 'eager' or 'lazy'");
}
