//! Blocking user notifications.

/// Show `message` in a blocking browser alert. Logged natively.
pub fn alert(message: &str) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
            return;
        }
    }
    log::warn!("{message}");
}
