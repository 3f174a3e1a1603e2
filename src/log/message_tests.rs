//! Tests for `LogMessage` formatting.

use serde_json::json;

use super::LogMessage;

fn to_json(message: &LogMessage) -> serde_json::Value {
    serde_json::to_value(message).unwrap()
}

mod delivered {
    use super::*;

    #[test]
    fn object_body_with_logs_is_kept_verbatim() {
        let body = r#"{"logs":["started","done"],"result":42}"#;
        let message = LogMessage::delivered(r#"{"a":1}"#, body);

        assert_eq!(
            to_json(&message),
            json!({
                "event": r#"{"a":1}"#,
                "logs": ["started", "done"],
                "returnValue": {"logs": ["started", "done"], "result": 42},
            })
        );
    }

    #[test]
    fn object_body_without_logs_gets_empty_logs() {
        let message = LogMessage::delivered("{}", r#"{"ok":true}"#);

        assert_eq!(
            to_json(&message),
            json!({"event": "{}", "logs": [], "returnValue": {"ok": true}})
        );
    }

    #[test]
    fn non_array_logs_field_is_copied_unchanged() {
        let message = LogMessage::delivered("{}", r#"{"logs":"single line"}"#);

        match message {
            LogMessage::Delivered { logs, .. } => assert_eq!(logs, json!("single line")),
            LogMessage::Failed { .. } => panic!("Expected delivered message"),
        }
    }

    #[test]
    fn plain_text_body_is_wrapped() {
        let message = LogMessage::delivered("{}", "plain text");

        assert_eq!(
            to_json(&message),
            json!({"event": "{}", "logs": [], "returnValue": {"rawResponse": "plain text"}})
        );
    }

    #[test]
    fn json_array_body_is_wrapped() {
        let message = LogMessage::delivered("{}", "[1,2,3]");

        assert_eq!(
            to_json(&message)["returnValue"],
            json!({"rawResponse": "[1,2,3]"})
        );
        assert_eq!(to_json(&message)["logs"], json!([]));
    }

    #[test]
    fn json_scalar_body_is_wrapped() {
        let message = LogMessage::delivered("{}", "\"quoted\"");

        assert_eq!(
            to_json(&message)["returnValue"],
            json!({"rawResponse": "\"quoted\""})
        );
    }

    #[test]
    fn empty_body_is_wrapped() {
        let message = LogMessage::delivered("{}", "");

        assert_eq!(to_json(&message)["returnValue"], json!({"rawResponse": ""}));
    }

    #[test]
    fn payload_is_embedded_as_string_even_when_json() {
        let payload = r#"{"nested": {"x": [1, 2]}}"#;
        let message = LogMessage::delivered(payload, "ok");

        assert_eq!(to_json(&message)["event"], json!(payload));
    }

    #[test]
    fn invalid_json_payload_is_embedded_unchanged() {
        let message = LogMessage::delivered("{not json", "ok");

        assert_eq!(to_json(&message)["event"], json!("{not json"));
    }

    #[test]
    fn formatting_is_deterministic() {
        let body = r#"{"logs":[{"level":"info"}],"value":"x"}"#;

        let first = LogMessage::delivered("payload", body);
        let second = LogMessage::delivered("payload", body);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn serialized_keys_are_in_documented_order() {
        let message = LogMessage::delivered("p", "{}");

        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"event":"p","logs":[],"returnValue":{}}"#
        );
    }

    #[test]
    fn object_body_keeps_its_key_order() {
        let body = r#"{"z":1,"a":2,"logs":["x"],"m":{"y":true,"b":false}}"#;

        let message = LogMessage::delivered("p", body);

        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            format!(r#"{{"event":"p","logs":["x"],"returnValue":{body}}}"#)
        );
    }
}

mod failed {
    use super::*;

    #[test]
    fn serializes_as_error_object() {
        let message = LogMessage::failed("Call to https://x/hook failed with: Request timed out");

        assert_eq!(
            to_json(&message),
            json!({"error": "Call to https://x/hook failed with: Request timed out"})
        );
        assert!(!message.is_delivered());
    }
}

mod deserialization {
    use super::*;

    #[test]
    fn both_shapes_deserialize_to_matching_variant() {
        let delivered: LogMessage =
            serde_json::from_str(r#"{"event":"e","logs":[],"returnValue":{"rawResponse":"x"}}"#)
                .unwrap();
        let failed: LogMessage = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();

        assert!(delivered.is_delivered());
        assert_eq!(failed, LogMessage::failed("boom"));
    }
}
