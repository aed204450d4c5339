use super::*;
use store::MessageId;
use time::macros::datetime;

fn sent(id: &str) -> Message {
    Message {
        id: MessageId::new(id),
        name: "anonymous".to_owned(),
        content: "hello".to_owned(),
        created_at: datetime!(2024-05-01 10:00 UTC),
    }
}

// =============================================================
// scroll_requests
// =============================================================

#[test]
fn scroll_requests_ignore_typing_and_live_rows() {
    let chat = RwSignal::new(ChatState::default());
    let seq = scroll_requests(chat);
    assert_eq!(seq.get_untracked(), 0);

    chat.update(|c| c.draft = "typing".to_owned());
    chat.update(|c| {
        c.receive_live(sent("other"));
    });
    chat.update(|c| {
        c.toggle_open();
    });
    assert_eq!(seq.get_untracked(), 0);
}

#[test]
fn scroll_requests_follow_successful_sends() {
    let chat = RwSignal::new(ChatState::default());
    let seq = scroll_requests(chat);

    chat.update(|c| c.record_sent(sent("a")));
    assert_eq!(seq.get_untracked(), 1);

    chat.update(|c| c.record_sent(sent("b")));
    assert_eq!(seq.get_untracked(), 2);
}
