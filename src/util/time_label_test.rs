use super::*;
use time::macros::datetime;

#[test]
fn utc_label_formats_minutes() {
    assert_eq!(utc_label(datetime!(2024-05-01 09:07:59 UTC)), "2024-05-01 09:07");
}

#[test]
fn utc_label_normalizes_offset() {
    assert_eq!(utc_label(datetime!(2024-05-01 02:30 +05:30)), "2024-04-30 21:00");
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn time_label_uses_utc_format_natively() {
    let ts = datetime!(2024-12-31 23:59 UTC);
    assert_eq!(time_label(ts), utc_label(ts));
}
