//! Human-readable message timestamps.
//!
//! In the browser the label follows the user's locale via
//! `Date.prototype.toLocaleString`. Native builds (SSR, tests) use a fixed
//! UTC format.

#[cfg(test)]
#[path = "time_label_test.rs"]
mod time_label_test;

use time::OffsetDateTime;
use time::macros::format_description;

/// Label shown next to a message.
pub fn time_label(ts: OffsetDateTime) -> String {
    #[cfg(feature = "hydrate")]
    {
        #[allow(clippy::cast_precision_loss)]
        let millis = (ts.unix_timestamp_nanos() / 1_000_000) as f64;
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(millis));
        String::from(date.to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        utc_label(ts)
    }
}

/// Fixed `YYYY-MM-DD HH:MM` rendering in UTC.
pub fn utc_label(ts: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    ts.to_offset(time::UtcOffset::UTC)
        .format(&format)
        .unwrap_or_else(|_| ts.to_string())
}
