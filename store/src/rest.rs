//! Hosted message store over a PostgREST-style HTTP API.
//!
//! Thin wrapper over `/rest/v1/{table}`: newest-first pages with an optional
//! `created_at=lt.{ts}` cursor, and inserts that ask for the stored row back.
//! Response parsing lives in free functions so it is testable without I/O.
//!
//! `reqwest` runs on both targets: browser `fetch` under wasm32 and a native
//! client everywhere else. Live inserts are delegated to whichever
//! [`RealtimeConnector`] the caller injects.

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

use std::rc::Rc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use time::OffsetDateTime;

use crate::client::{InsertHandler, MessageStore, Subscription};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::model::{Message, NewMessage, format_timestamp};
use crate::realtime::{ChannelSpec, RealtimeConnector};

// =============================================================================
// CLIENT
// =============================================================================

/// [`MessageStore`] backed by a hosted REST table and realtime socket.
pub struct SupabaseStore {
    http: reqwest::Client,
    config: StoreConfig,
    realtime: Option<Rc<dyn RealtimeConnector>>,
}

impl SupabaseStore {
    /// Create a store without live updates.
    pub fn new(config: StoreConfig) -> Self {
        Self { http: reqwest::Client::new(), config, realtime: None }
    }

    /// Attach the transport used for [`MessageStore::subscribe_inserts`].
    #[must_use]
    pub fn with_realtime(mut self, connector: Rc<dyn RealtimeConnector>) -> Self {
        self.realtime = Some(connector);
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.config.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.anon_key))
    }
}

#[async_trait(?Send)]
impl MessageStore for SupabaseStore {
    async fn fetch_page(&self, before: Option<OffsetDateTime>, limit: usize) -> Result<Vec<Message>, StoreError> {
        let query = page_query(before, limit)?;
        let request = self
            .http
            .get(self.table_url())
            .query(&query)
            .header("Accept-Profile", &self.config.schema);
        let response = self.authorized(request).send().await?;
        let body = success_body(response).await?;
        parse_page(&body)
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, StoreError> {
        let request = self
            .http
            .post(self.table_url())
            .header("Content-Profile", &self.config.schema)
            .header("Prefer", "return=representation")
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_string(message)?);
        let response = self.authorized(request).send().await?;
        let body = success_body(response).await?;
        parse_inserted(&body)
    }

    fn subscribe_inserts(&self, on_insert: InsertHandler) -> Result<Subscription, StoreError> {
        let Some(connector) = &self.realtime else {
            return Err(StoreError::RealtimeUnavailable);
        };
        let channel = ChannelSpec::from_config(&self.config)?;
        connector.subscribe(channel, on_insert)
    }
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

fn page_query(before: Option<OffsetDateTime>, limit: usize) -> Result<Vec<(&'static str, String)>, StoreError> {
    let mut query = vec![
        ("select", "*".to_owned()),
        ("order", "created_at.desc".to_owned()),
        ("limit", limit.to_string()),
    ];
    if let Some(before) = before {
        let ts = format_timestamp(before).map_err(|e| StoreError::Parse(e.to_string()))?;
        query.push(("created_at", format!("lt.{ts}")));
    }
    Ok(query)
}

async fn success_body(response: reqwest::Response) -> Result<String, StoreError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    if !(200..300).contains(&status) {
        return Err(StoreError::Status { status, body });
    }
    Ok(body)
}

fn parse_page(body: &str) -> Result<Vec<Message>, StoreError> {
    Ok(serde_json::from_str(body)?)
}

fn parse_inserted(body: &str) -> Result<Message, StoreError> {
    let rows: Vec<Message> = serde_json::from_str(body)?;
    rows.into_iter().next().ok_or(StoreError::EmptyInsert)
}
