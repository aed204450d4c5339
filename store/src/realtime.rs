//! Realtime insert channel: Phoenix-channel protocol and transport seam.
//!
//! The hosted backend pushes row changes over a Phoenix websocket (JSON
//! serializer, `vsn=1.0.0`). [`ChannelSession`] is the pure protocol state
//! machine: it builds join/heartbeat/leave frames and classifies inbound
//! text frames. Transports (browser `gloo-net`, native `tokio-tungstenite`)
//! own the socket and the timers and implement [`RealtimeConnector`].
//!
//! Insert events missed while a transport is reconnecting are not replayed.

#[cfg(test)]
#[path = "realtime_test.rs"]
mod realtime_test;

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::client::{InsertHandler, Subscription};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::model::Message;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
pub const INITIAL_BACKOFF_MS: u32 = 1000;
pub const MAX_BACKOFF_MS: u32 = 10_000;

const PHOENIX_TOPIC: &str = "phoenix";

/// Opens live insert subscriptions for a channel.
pub trait RealtimeConnector {
    /// Start delivering inserts on `channel` to `on_insert` until the
    /// returned handle is released.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Realtime`] when the transport cannot start.
    fn subscribe(&self, channel: ChannelSpec, on_insert: InsertHandler) -> Result<Subscription, StoreError>;
}

/// Where and what to subscribe to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelSpec {
    pub socket_url: String,
    pub schema: String,
    pub table: String,
    pub access_token: String,
}

impl ChannelSpec {
    /// Derive the channel for the configured message table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Realtime`] if the store URL is not http(s).
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self {
            socket_url: socket_url(&config.url, &config.anon_key)?,
            schema: config.schema.clone(),
            table: config.table.clone(),
            access_token: config.anon_key.clone(),
        })
    }

    #[must_use]
    pub fn topic(&self) -> String {
        format!("realtime:{}:{}", self.schema, self.table)
    }
}

/// Build the websocket URL for a project base URL.
///
/// # Errors
///
/// Returns [`StoreError::Realtime`] if `base_url` is not http(s).
pub fn socket_url(base_url: &str, api_key: &str) -> Result<String, StoreError> {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(StoreError::Realtime(format!("unsupported store URL: {base_url}")));
    };
    Ok(format!("{ws_base}/realtime/v1/websocket?apikey={api_key}&vsn=1.0.0"))
}

/// Next reconnect delay after `current_ms`, doubling up to the cap.
#[must_use]
pub fn next_backoff(current_ms: u32) -> u32 {
    current_ms.saturating_mul(2).min(MAX_BACKOFF_MS)
}

/// How a transport session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The subscriber released the channel; do not reconnect.
    Released,
    /// The socket or channel dropped. `joined` records whether the join was
    /// acknowledged first.
    Dropped { joined: bool },
}

/// Delay before reconnecting after `end` (`None` for a failed session).
///
/// A session that joined resets the delay; anything else backs off.
#[must_use]
pub fn reconnect_delay(end: Option<SessionEnd>, current_ms: u32) -> u32 {
    match end {
        Some(SessionEnd::Dropped { joined: true }) => INITIAL_BACKOFF_MS,
        _ => next_backoff(current_ms),
    }
}

/// Classified inbound frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A row was inserted into the subscribed table.
    Insert(Message),
    /// The server accepted our join.
    Joined,
    /// The server refused the join or the change subscription.
    JoinFailed(String),
    /// The server closed or errored the channel; reconnect.
    Closed(String),
    /// Heartbeat replies, presence, other topics, unknown events.
    Ignored,
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "ref", default)]
    reference: Option<String>,
}

/// Protocol state for one channel on one socket connection.
#[derive(Debug)]
pub struct ChannelSession {
    spec: ChannelSpec,
    topic: String,
    next_ref: u64,
    join_ref: Option<String>,
}

impl ChannelSession {
    pub fn new(spec: ChannelSpec) -> Self {
        let topic = spec.topic();
        Self { spec, topic, next_ref: 1, join_ref: None }
    }

    #[must_use]
    pub fn socket_url(&self) -> &str {
        &self.spec.socket_url
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn take_ref(&mut self) -> String {
        let reference = self.next_ref.to_string();
        self.next_ref += 1;
        reference
    }

    /// Join frame requesting INSERT changes on the table.
    pub fn join(&mut self) -> String {
        let reference = self.take_ref();
        self.join_ref = Some(reference.clone());
        serde_json::json!({
            "topic": self.topic,
            "event": "phx_join",
            "payload": {
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [{
                        "event": "INSERT",
                        "schema": self.spec.schema,
                        "table": self.spec.table,
                    }],
                    "private": false,
                },
                "access_token": self.spec.access_token,
            },
            "ref": reference,
            "join_ref": reference,
        })
        .to_string()
    }

    pub fn heartbeat(&mut self) -> String {
        let reference = self.take_ref();
        serde_json::json!({
            "topic": PHOENIX_TOPIC,
            "event": "heartbeat",
            "payload": {},
            "ref": reference,
        })
        .to_string()
    }

    pub fn leave(&mut self) -> String {
        let reference = self.take_ref();
        serde_json::json!({
            "topic": self.topic,
            "event": "phx_leave",
            "payload": {},
            "ref": reference,
            "join_ref": self.join_ref,
        })
        .to_string()
    }

    /// Classify an inbound text frame.
    #[must_use]
    pub fn handle_text(&self, text: &str) -> SessionEvent {
        let frame = match serde_json::from_str::<InboundFrame>(text) {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("ignoring undecodable realtime frame: {err}");
                return SessionEvent::Ignored;
            }
        };
        if frame.topic != self.topic {
            return SessionEvent::Ignored;
        }

        match frame.event.as_str() {
            "postgres_changes" => insert_from_change(frame.payload.get("data")),
            // Legacy realtime servers emit the row change type as the event.
            "INSERT" => insert_from_change(Some(&frame.payload)),
            "phx_reply" if frame.reference.is_some() && frame.reference == self.join_ref => {
                if frame.payload.get("status").and_then(Value::as_str) == Some("ok") {
                    SessionEvent::Joined
                } else {
                    SessionEvent::JoinFailed(reply_reason(&frame.payload))
                }
            }
            "system" if frame.payload.get("status").and_then(Value::as_str) == Some("error") => {
                let message = frame
                    .payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("subscription error");
                SessionEvent::JoinFailed(message.to_owned())
            }
            "phx_error" => SessionEvent::Closed("channel error".to_owned()),
            "phx_close" => SessionEvent::Closed("channel closed".to_owned()),
            _ => SessionEvent::Ignored,
        }
    }
}

fn insert_from_change(change: Option<&Value>) -> SessionEvent {
    let Some(change) = change else {
        return SessionEvent::Ignored;
    };
    if change.get("type").and_then(Value::as_str) != Some("INSERT") {
        return SessionEvent::Ignored;
    }
    let Some(record) = change.get("record") else {
        return SessionEvent::Ignored;
    };
    match Message::deserialize(record) {
        Ok(msg) => SessionEvent::Insert(msg),
        Err(err) => {
            log::warn!("dropping malformed realtime insert: {err}");
            SessionEvent::Ignored
        }
    }
}

fn reply_reason(payload: &Value) -> String {
    let response = payload.get("response");
    response
        .and_then(|r| r.get("reason"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| response.map(Value::to_string))
        .unwrap_or_else(|| "join refused".to_owned())
}
