//! Message model and its wire representation.
//!
//! DESIGN
//! ======
//! `Message` mirrors one row of the hosted `messages` table. Identifiers are
//! opaque: the table may use uuid or bigint keys, so [`MessageId`] accepts
//! either JSON strings or integers and only ever compares for equality.
//! Timestamps arrive as RFC 3339 from the REST endpoint and in Postgres text
//! form from the realtime channel; both parse into [`OffsetDateTime`].

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ValidationError;

/// Placeholder author name used when none is supplied.
pub const DEFAULT_AUTHOR_NAME: &str = "anonymous";

/// Store-assigned message identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// A persisted chat message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(default = "default_author_name", deserialize_with = "name_or_default")]
    pub name: String,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
}

/// Insert payload for a new message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub name: String,
    pub content: String,
}

impl NewMessage {
    /// Build an insert payload from raw composer fields.
    ///
    /// Content is trimmed and must not be empty. A blank author falls back
    /// to `default_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyContent`] when `draft` is empty after
    /// trimming.
    pub fn from_draft(author: &str, draft: &str, default_name: &str) -> Result<Self, ValidationError> {
        let content = draft.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        let author = author.trim();
        let name = if author.is_empty() { default_name } else { author };
        Ok(Self { name: name.to_owned(), content: content.to_owned() })
    }
}

fn default_author_name() -> String {
    DEFAULT_AUTHOR_NAME.to_owned()
}

fn name_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(default_author_name))
}

/// Parse a store timestamp.
///
/// Accepts RFC 3339 and the Postgres text form (`2024-05-01 10:00:00.5+00`).
/// A value without any offset is read as UTC.
///
/// # Errors
///
/// Returns the RFC 3339 parse error when neither form matches.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let raw = raw.trim();
    match OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(ts) => Ok(ts),
        Err(_) => OffsetDateTime::parse(&normalize_pg_timestamp(raw), &Rfc3339),
    }
}

/// Format a timestamp the way the store expects it in filters.
///
/// # Errors
///
/// Fails only for values RFC 3339 cannot express (years beyond 9999).
pub fn format_timestamp(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    ts.format(&Rfc3339)
}

fn normalize_pg_timestamp(raw: &str) -> String {
    let mut out = raw.replacen(' ', "T", 1);
    let Some(time_start) = out.find('T') else {
        return out;
    };
    match out[time_start..].rfind(['+', '-']) {
        // `+00` -> `+00:00`, `+0530` -> `+05:30`
        Some(rel) => {
            let offset_start = time_start + rel;
            let offset = out[offset_start + 1..].to_owned();
            if offset.len() == 2 {
                out.push_str(":00");
            } else if offset.len() == 4 && !offset.contains(':') {
                out.insert(offset_start + 3, ':');
            }
        }
        None if !out.ends_with('Z') && !out.ends_with('z') => out.push('Z'),
        None => {}
    }
    out
}

pub(crate) mod timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(ts: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = super::format_timestamp(*ts).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
