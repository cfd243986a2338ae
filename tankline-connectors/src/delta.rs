//! Signal K delta messages
//!
//! Borrowing, serialize-only model: building a delta for one emission
//! copies nothing, and [`Delta::encode_into`] reuses the caller's buffer.

use serde::{Serialize, Serializer};
use tankline_core::Value;

use crate::ConnectorError;

/// Context for data about the local vessel
pub const DEFAULT_CONTEXT: &str = "vessels.self";

/// A delta message: one or more updates within one context
#[derive(Debug, Clone, Serialize)]
pub struct Delta<'a> {
    pub context: &'a str,
    pub updates: &'a [Update<'a>],
}

/// Values reported together by one source
#[derive(Debug, Clone, Serialize)]
pub struct Update<'a> {
    pub source: Source<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<&'a str>,
    pub values: &'a [PathValue<'a>],
}

/// Who produced the values
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Source<'a> {
    pub label: &'a str,
}

/// One value under one path
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PathValue<'a> {
    pub path: &'a str,
    #[serde(serialize_with = "serialize_value")]
    pub value: Value,
}

impl<'a> Delta<'a> {
    /// Serialize as compact JSON, replacing the contents of `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<(), ConnectorError> {
        buf.clear();
        serde_json::to_writer(&mut *buf, self)?;
        Ok(())
    }

    /// Serialize as a compact JSON string
    pub fn to_json(&self) -> Result<String, ConnectorError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Floats keep their `f32` shortest representation; NaN and infinities
/// become `null`
fn serialize_value<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
    match *value {
        Value::Float(v) if v.is_finite() => serializer.serialize_f32(v),
        Value::Float(_) => serializer.serialize_none(),
        Value::Int(v) => v.serialize(serializer),
        Value::Bool(v) => v.serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(label: &str, path: &str, value: Value) -> serde_json::Value {
        let values = [PathValue { path, value }];
        let updates = [Update {
            source: Source { label },
            timestamp: None,
            values: &values,
        }];
        let delta = Delta { context: DEFAULT_CONTEXT, updates: &updates };

        serde_json::from_str(&delta.to_json().unwrap()).unwrap()
    }

    #[test]
    fn level_delta_shape() {
        let json = single("tank-sensor", "tanks.fuel.currentLevel", Value::Float(50.0));

        assert_eq!(
            json,
            serde_json::json!({
                "context": "vessels.self",
                "updates": [{
                    "source": { "label": "tank-sensor" },
                    "values": [{ "path": "tanks.fuel.currentLevel", "value": 50.0 }]
                }]
            })
        );
    }

    #[test]
    fn value_kinds() {
        let status = single("s", "tanks.fuel.sensorStatus", Value::Bool(true));
        assert_eq!(status["updates"][0]["values"][0]["value"], true);

        let uptime = single("s", "sensorDevice.s.uptime", Value::Int(120));
        assert_eq!(uptime["updates"][0]["values"][0]["value"], 120);

        let missing = single("s", "tanks.fuel.currentLevel", Value::Float(f32::NAN));
        assert!(missing["updates"][0]["values"][0]["value"].is_null());
    }

    #[test]
    fn floats_use_short_form() {
        let values = [PathValue { path: "a", value: Value::Float(0.1) }];
        let updates = [Update { source: Source { label: "s" }, timestamp: None, values: &values }];
        let text = Delta { context: DEFAULT_CONTEXT, updates: &updates }.to_json().unwrap();

        assert!(text.contains("\"value\":0.1}"), "{text}");
    }

    #[test]
    fn encode_reuses_buffer() {
        let values = [PathValue { path: "a", value: Value::Int(1) }];
        let updates = [Update {
            source: Source { label: "s" },
            timestamp: Some("2024-01-01T00:00:00Z"),
            values: &values,
        }];
        let delta = Delta { context: DEFAULT_CONTEXT, updates: &updates };

        let mut buf = b"stale".to_vec();
        delta.encode_into(&mut buf).unwrap();

        let text = std::str::from_utf8(&buf).unwrap();
        assert!(text.starts_with("{\"context\""));
        assert!(text.contains("\"timestamp\":\"2024-01-01T00:00:00Z\""));
    }
}
