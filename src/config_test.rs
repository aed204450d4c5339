use super::*;

#[test]
fn build_lookup_ignores_unknown_variables() {
    assert_eq!(build_lookup("HOME"), None);
    assert_eq!(build_lookup(""), None);
}

#[test]
fn chat_options_always_yield_a_usable_page_size() {
    assert!(chat_options().page_size >= 1);
}

#[test]
fn store_config_reports_store_variables_only() {
    match store_config() {
        Ok(config) => assert!(config.url.starts_with("http")),
        Err(ConfigError::Missing(var)) => assert!(var.starts_with("CHAT_STORE_")),
        Err(ConfigError::Invalid { var, .. }) => assert_eq!(var, "CHAT_STORE_URL"),
    }
}
