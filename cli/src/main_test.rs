use super::*;
use store::MessageId;
use time::macros::datetime;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["chat-cli"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

// =============================================================
// Argument parsing
// =============================================================

#[test]
fn history_flags_feed_store_config() {
    let cli = parse(&[
        "--url",
        "https://demo.supabase.co/",
        "--anon-key",
        "anon",
        "--table",
        "lobby",
        "history",
        "--pages",
        "2",
    ]);
    let config = cli.store_config().unwrap();
    assert_eq!(config.url, "https://demo.supabase.co");
    assert_eq!(config.anon_key, "anon");
    assert_eq!(config.table, "lobby");
    assert!(matches!(cli.command, Command::History { pages: 2 }));
}

#[test]
fn post_takes_optional_name_and_content() {
    let cli = parse(&["--url", "https://demo.supabase.co", "--anon-key", "k", "post", "--name", "Ann", "hi there"]);
    let Command::Post { name, content } = cli.command else {
        panic!("expected post command");
    };
    assert_eq!(name.as_deref(), Some("Ann"));
    assert_eq!(content, "hi there");
}

#[test]
fn zero_page_size_is_rejected() {
    let cli = parse(&["--page-size", "0", "tail"]);
    assert!(matches!(
        cli.chat_options(),
        Err(ConfigError::Invalid { var: "CHAT_PAGE_SIZE", .. })
    ));
}

#[test]
fn page_size_and_default_name_reach_options() {
    let cli = parse(&["--page-size", "5", "--default-name", "guest", "tail"]);
    let options = cli.chat_options().unwrap();
    assert_eq!(options.page_size, 5);
    assert_eq!(options.default_name, "guest");
}

#[test]
fn lookup_ignores_unknown_variables() {
    let cli = parse(&["tail"]);
    assert_eq!(cli.lookup("CHAT_INIT_POLICY"), None);
}

// =============================================================
// Output
// =============================================================

#[test]
fn format_row_shows_timestamp_name_and_content() {
    let msg = Message {
        id: MessageId::new("1"),
        name: "Ann".to_owned(),
        content: "hello".to_owned(),
        created_at: datetime!(2024-05-01 10:00 UTC),
    };
    assert_eq!(format_row(&msg), "[2024-05-01T10:00:00Z] Ann: hello");
}
