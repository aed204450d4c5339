use super::*;
use store::realtime::HEARTBEAT_INTERVAL;

#[test]
fn heartbeat_interval_fits_timer_millis() {
    assert_eq!(interval_millis(HEARTBEAT_INTERVAL), 30_000);
}

#[test]
fn oversized_interval_saturates() {
    assert_eq!(interval_millis(Duration::from_secs(u64::MAX)), u32::MAX);
}
