//! Job Status Model
//!
//! Terminal status of a scheduled job as emitted by the host on `job:terminated`.
//! Timestamps arrive either as epoch milliseconds or as RFC 3339 strings.

use std::fmt;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Call methods that are reported on. Anything else in a job is ignored.
pub const RECOGNIZED_METHODS: [&str; 2] = ["vm.rollingBackup", "vm.rollingSnapshot"];

/// Terminal status of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub start: Timestamp,
    pub end: Timestamp,
    #[serde(default)]
    pub calls: Vec<CallRecord>,
}

/// A single operation executed as part of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub method: String,
    #[serde(default)]
    pub params: Option<CallParams>,
    pub start: Timestamp,
    pub end: Timestamp,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// Call parameters; only the target id is interpreted.
///
/// The id is kept as raw JSON so a malformed id leaves the call unresolved
/// instead of rejecting the whole job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallParams {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl JobStatus {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end, calls: Vec::new() }
    }

    pub fn with_call(mut self, call: CallRecord) -> Self {
        self.calls.push(call);
        self
    }

    /// Calls whose method is on the recognized list, in original order
    pub fn recognized_calls(&self) -> impl Iterator<Item = &CallRecord> {
        self.calls.iter().filter(|call| call.is_recognized())
    }
}

impl CallRecord {
    pub fn new<S: Into<String>>(method: S, start: Timestamp, end: Timestamp) -> Self {
        Self {
            method: method.into(),
            params: None,
            start,
            end,
            error: None,
        }
    }

    pub fn with_target<S: Into<String>>(mut self, id: S) -> Self {
        self.params = Some(CallParams {
            id: Some(serde_json::Value::String(id.into())),
            extra: serde_json::Map::new(),
        });
        self
    }

    pub fn with_error(mut self, error: serde_json::Value) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_recognized(&self) -> bool {
        RECOGNIZED_METHODS.contains(&self.method.as_str())
    }

    /// A null error is treated the same as an absent one
    pub fn failed(&self) -> bool {
        matches!(&self.error, Some(value) if !value.is_null())
    }

    pub fn target_id(&self) -> Option<&str> {
        self.params
            .as_ref()
            .and_then(|params| params.id.as_ref())
            .and_then(serde_json::Value::as_str)
    }
}

/// Point in time carried by job and call records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Timestamp)
    }

    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Signed milliseconds elapsed from `earlier` to `self`
    pub fn millis_since(&self, earlier: &Timestamp) -> i64 {
        self.millis() - earlier.millis()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%a %b %d %Y %H:%M:%S GMT%z"))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Millis(millis) => Timestamp::from_millis(millis)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", millis))),
            RawTimestamp::Float(millis) => Timestamp::from_millis(millis.round() as i64)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", millis))),
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|parsed| Timestamp(parsed.with_timezone(&Utc)))
                .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", text, e))),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.millis())
    }
}
