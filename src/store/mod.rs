//! Store client abstraction
//!
//! A `StoreClient` is one long-lived, shareable connection to the columnar
//! datastore. Statements carry typed named placeholders such as
//! `{owner:String}`; the matching values travel separately in [`Params`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;

pub mod clickhouse;

pub use clickhouse::{ClickHouseClient, ClickHouseConfig};

/// One result row, keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Store client trait
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Short name of the backing store, reported by health checks
    fn name(&self) -> &str;

    /// Liveness check bounded by `timeout`
    async fn ping(&self, timeout: Duration) -> Result<()>;

    /// Run a statement that returns no rows
    async fn execute(&self, statement: &str, params: &Params) -> Result<()>;

    /// Run a statement and collect every row it returns
    async fn query(&self, statement: &str, params: &Params) -> Result<Vec<Row>>;
}

/// A bound statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt8(u8),
    UInt64(u64),
    String(String),
    DateTime(DateTime<Utc>),
    Null,
}

impl Value {
    /// Render in the text form ClickHouse parses query parameters from
    pub fn to_param_text(&self) -> String {
        match self {
            Value::UInt8(v) => v.to_string(),
            Value::UInt64(v) => v.to_string(),
            Value::String(s) => escape(s),
            Value::DateTime(ts) => ts.format("%Y-%m-%d %H:%M:%S%.9f").to_string(),
            Value::Null => "\\N".to_string(),
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::UInt8(v as u8)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Named statement parameters, in binding order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Value)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub enum StoreConfig {
    ClickHouse(ClickHouseConfig),
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_param_text() {
        assert_eq!(Value::from(42u64).to_param_text(), "42");
        assert_eq!(Value::from(true).to_param_text(), "1");
        assert_eq!(Value::from(None::<String>).to_param_text(), "\\N");
        assert_eq!(
            Value::from("tab\there\\".to_string()).to_param_text(),
            "tab\\there\\\\"
        );

        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(
            Value::from(ts).to_param_text(),
            "2024-03-01 12:30:05.000000000"
        );
    }

    #[test]
    fn test_params_lookup() {
        let params = Params::new().bind("id", 5u64).bind("owner", "alice");

        assert_eq!(params.get("owner"), Some(&Value::String("alice".into())));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.iter().count(), 2);
    }
}
