mod socket;
mod tail;

use std::cell::RefCell;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use store::model::format_timestamp;
use store::{
    ChatController, ChatError, ChatOptions, ChatState, ConfigError, LoadOlder, Message, StoreConfig, StoreError,
    SupabaseStore,
};
use tracing_subscriber::EnvFilter;

use crate::socket::TungsteniteRealtime;
use crate::tail::TailState;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "chat-cli", about = "Read, post, and follow chat widget messages")]
struct Cli {
    #[arg(long, env = "CHAT_STORE_URL")]
    url: Option<String>,

    #[arg(long, env = "CHAT_STORE_ANON_KEY", hide_env_values = true)]
    anon_key: Option<String>,

    #[arg(long, env = "CHAT_STORE_SCHEMA")]
    schema: Option<String>,

    #[arg(long, env = "CHAT_STORE_TABLE")]
    table: Option<String>,

    #[arg(long, env = "CHAT_PAGE_SIZE")]
    page_size: Option<String>,

    #[arg(long, env = "CHAT_DEFAULT_NAME")]
    default_name: Option<String>,

    /// Print rows as JSON lines instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the newest page plus up to N older pages, oldest first.
    History {
        #[arg(long, default_value_t = 0)]
        pages: usize,
    },
    /// Post a message and print the stored row.
    Post {
        #[arg(long)]
        name: Option<String>,
        content: String,
    },
    /// Print the newest page, then follow live inserts until Ctrl-C.
    Tail,
}

impl Cli {
    fn lookup(&self, var: &str) -> Option<String> {
        match var {
            "CHAT_STORE_URL" => self.url.clone(),
            "CHAT_STORE_ANON_KEY" => self.anon_key.clone(),
            "CHAT_STORE_SCHEMA" => self.schema.clone(),
            "CHAT_STORE_TABLE" => self.table.clone(),
            "CHAT_PAGE_SIZE" => self.page_size.clone(),
            "CHAT_DEFAULT_NAME" => self.default_name.clone(),
            _ => None,
        }
    }

    fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        StoreConfig::from_lookup(|var| self.lookup(var))
    }

    fn chat_options(&self) -> Result<ChatOptions, ConfigError> {
        ChatOptions::from_lookup(|var| self.lookup(var))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let local = tokio::task::LocalSet::new();
    local.run_until(run(cli)).await
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.store_config()?;
    let options = cli.chat_options()?;
    let output = Output { json: cli.json };

    match cli.command {
        Command::History { pages } => run_history(SupabaseStore::new(config), options, pages, output).await,
        Command::Post { name, content } => run_post(SupabaseStore::new(config), options, name, content, output).await,
        Command::Tail => run_tail(config, options, output).await,
    }
}

async fn run_history(store: SupabaseStore, options: ChatOptions, pages: usize, output: Output) -> Result<(), CliError> {
    let state = Rc::new(RefCell::new(ChatState::default()));
    let controller = ChatController::new(Rc::new(store), state.clone(), options);
    controller.initialize().await;

    for _ in 0..pages {
        match controller.load_older().await {
            LoadOlder::Appended(count) => tracing::debug!(count, "loaded older page"),
            LoadOlder::Exhausted(count) => {
                tracing::debug!(count, "history exhausted");
                break;
            }
            LoadOlder::Skipped | LoadOlder::Failed => break,
        }
    }

    let state = state.borrow();
    for msg in state.messages().iter().rev() {
        output.print(msg)?;
    }
    Ok(())
}

async fn run_post(
    store: SupabaseStore,
    options: ChatOptions,
    name: Option<String>,
    content: String,
    output: Output,
) -> Result<(), CliError> {
    let state = Rc::new(RefCell::new(ChatState::default()));
    {
        let mut draft = state.borrow_mut();
        draft.author = name.unwrap_or_default();
        draft.draft = content;
    }

    let controller = ChatController::new(Rc::new(store), state, options);
    let msg = controller.post_message().await?;
    output.print(&msg)
}

async fn run_tail(config: StoreConfig, options: ChatOptions, output: Output) -> Result<(), CliError> {
    let transport = TungsteniteRealtime::default();
    let store = SupabaseStore::new(config).with_realtime(Rc::new(transport.clone()));
    let controller = ChatController::new(Rc::new(store), TailState::new(output), options);
    controller.initialize().await;
    if !controller.is_subscribed() {
        tracing::warn!("live updates unavailable; showing the newest page only");
    }

    tokio::signal::ctrl_c().await?;
    controller.teardown();
    transport.closed().await;
    Ok(())
}

#[derive(Clone, Copy, Debug)]
struct Output {
    json: bool,
}

impl Output {
    fn print(self, msg: &Message) -> Result<(), CliError> {
        let line = if self.json { serde_json::to_string(msg)? } else { format_row(msg) };
        println!("{line}");
        Ok(())
    }
}

fn format_row(msg: &Message) -> String {
    let stamp = format_timestamp(msg.created_at).unwrap_or_else(|_| msg.created_at.to_string());
    format!("[{stamp}] {}: {}", msg.name, msg.content)
}
