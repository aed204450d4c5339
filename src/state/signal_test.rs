use super::*;

#[test]
fn update_is_visible_to_read() {
    let cell = SignalState(RwSignal::new(ChatState::default()));
    cell.update(|s| s.draft = "hello".to_owned());
    assert_eq!(cell.read(|s| s.draft.clone()), Some("hello".to_owned()));
}

#[test]
fn update_returns_closure_result() {
    let cell = SignalState(RwSignal::new(ChatState::default()));
    assert_eq!(cell.update(ChatState::toggle_open), Some(true));
    assert_eq!(cell.update(ChatState::toggle_open), Some(false));
}

#[test]
fn disposed_signal_yields_none() {
    let signal = RwSignal::new(ChatState::default());
    let cell = SignalState(signal);
    signal.dispose();
    assert_eq!(cell.read(|s| s.open), None);
    assert_eq!(cell.update(|s| s.open = true), None);
}
