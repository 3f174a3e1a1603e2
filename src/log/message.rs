//! Formatting of the `message` object carried by each delivery log.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which an unparseable response body is wrapped.
pub const RAW_RESPONSE_KEY: &str = "rawResponse";

/// Key of the log list inside an endpoint's JSON response.
pub const LOGS_KEY: &str = "logs";

/// Outcome description stored in a [`LogItem`](super::LogItem).
///
/// Serializes without a tag, so the two shapes on the wire are:
///
/// ```json
/// {"event": "<payload>", "logs": [...], "returnValue": {...}}
/// {"error": "<description>"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogMessage {
    /// The endpoint returned a response.
    Delivered {
        /// The request payload, as sent (never parsed)
        event: String,
        /// The response's `logs` field, or `[]`
        logs: Value,
        /// The response object, or `{"rawResponse": <body>}`
        #[serde(rename = "returnValue")]
        return_value: Value,
    },

    /// No response was obtained.
    Failed {
        /// Human-readable failure description
        error: String,
    },
}

impl LogMessage {
    /// Builds the message for a delivery that received `response_body`.
    ///
    /// A body that parses as a JSON object becomes `returnValue` as-is, and its
    /// `logs` field (if any) is lifted to the top level unchanged. Any other
    /// body, including valid JSON that is not an object, is wrapped as
    /// `{"rawResponse": <body>}` with empty `logs`.
    #[must_use]
    pub fn delivered(payload: &str, response_body: &str) -> Self {
        let (logs, return_value) = match serde_json::from_str::<Value>(response_body) {
            Ok(Value::Object(object)) => {
                let logs = object
                    .get(LOGS_KEY)
                    .cloned()
                    .unwrap_or_else(|| Value::Array(Vec::new()));
                (logs, Value::Object(object))
            }
            _ => (Value::Array(Vec::new()), raw_response(response_body)),
        };

        Self::Delivered {
            event: payload.to_string(),
            logs,
            return_value,
        }
    }

    /// Builds the message for a failed delivery.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Returns true for [`LogMessage::Delivered`].
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

fn raw_response(body: &str) -> Value {
    let mut wrapper = Map::new();
    wrapper.insert(RAW_RESPONSE_KEY.to_string(), Value::String(body.to_string()));
    Value::Object(wrapper)
}
