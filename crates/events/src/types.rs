//! Shared value types passed between the consumer and downstream handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Execution context
// ---------------------------------------------------------------------------

/// Key holding the workflow execution identifier.
pub const EXECUTION_ID_KEY: &str = "execution_id";

/// Key holding the time the execution started.
pub const STARTED_AT_KEY: &str = "started_at";

/// Contextual information about the workflow execution a handler runs in.
///
/// Handlers only ever receive the payload and this context, never the full
/// envelope. The context is an opaque JSON object owned by the host: any
/// object is accepted and round-trips unchanged. The well-known keys are read
/// leniently through [`ExecutionContext::execution_id`] and
/// [`ExecutionContext::started_at`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext(Map<String, Value>);

impl ExecutionContext {
    /// Creates a context for the execution identified by `execution_id`,
    /// starting now.
    pub fn new(execution_id: impl Into<String>) -> Self {
        let mut attributes = Map::new();
        attributes.insert(EXECUTION_ID_KEY.to_string(), Value::String(execution_id.into()));
        attributes.insert(
            STARTED_AT_KEY.to_string(),
            Value::String(Timestamp::now().to_string()),
        );
        Self(attributes)
    }

    /// The execution identifier. Strings are returned as-is and numbers in
    /// their decimal form; any other type yields `None`.
    pub fn execution_id(&self) -> Option<String> {
        match self.0.get(EXECUTION_ID_KEY)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// When the execution started. Accepts an RFC 3339 string or integer
    /// seconds since the Unix epoch; anything else yields `None`.
    pub fn started_at(&self) -> Option<Timestamp> {
        match self.0.get(STARTED_AT_KEY)? {
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| Timestamp::from_utc(dt.with_timezone(&Utc))),
            Value::Number(secs) => secs
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(Timestamp::from_utc),
            _ => None,
        }
    }

    /// Looks up any attribute by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Every attribute, including the well-known keys.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
