use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Client → server wire messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Sent once, immediately after the socket opens, carrying the outbound
    /// parameters attached at connect time (e.g. `csrf_token`).
    Handshake {
        session_id: Uuid,
        params: BTreeMap<String, String>,
    },
    /// A named event with a JSON payload, e.g. `quill_updated`.
    Event { name: String, payload: Value },
}

impl ClientMessage {
    pub fn handshake(session_id: Uuid, params: BTreeMap<String, String>) -> Self {
        Self::Handshake { session_id, params }
    }

    pub fn event(name: impl Into<String>, payload: Value) -> Self {
        Self::Event {
            name: name.into(),
            payload,
        }
    }

    pub fn encode(&self) -> Result<Message> {
        Ok(Message::Text(serde_json::to_string(self)?.into()))
    }
}

/// Server → client wire messages. Text frames are JSON; binary frames are
/// accepted as CBOR.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    HandshakeAck { session_id: Uuid },
    Event { name: String, payload: Value },
    Log { level: String, message: String },
    ReloadAttached,
}

impl ServerMessage {
    pub fn decode(frame: &Message) -> Option<ServerMessage> {
        match frame {
            Message::Text(text) => serde_json::from_str(text.as_str()).ok(),
            Message::Binary(bin) => serde_cbor::from_slice(bin).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_round_trips_as_json_text() {
        let msg = ClientMessage::event("quill_updated", json!({"delta": {"ops": []}}));
        let frame = msg.encode().unwrap();
        let Message::Text(text) = frame else {
            panic!("expected text frame");
        };
        let value: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["name"], "quill_updated");
        assert_eq!(value["payload"]["delta"]["ops"], json!([]));
    }

    #[test]
    fn handshake_carries_params() {
        let id = Uuid::new_v4();
        let params = [("csrf_token".to_string(), "tok".to_string())]
            .into_iter()
            .collect();
        let frame = ClientMessage::handshake(id, params).encode().unwrap();
        let Message::Text(text) = frame else {
            panic!("expected text frame");
        };
        let value: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["type"], "handshake");
        assert_eq!(value["params"]["csrf_token"], "tok");
    }

    #[test]
    fn decodes_json_text_frames() {
        let frame = Message::Text(
            r#"{"type":"log","level":"info","message":"compiled"}"#.into(),
        );
        let decoded = ServerMessage::decode(&frame).unwrap();
        assert!(matches!(decoded, ServerMessage::Log { level, message }
            if level == "info" && message == "compiled"));
    }

    #[test]
    fn decodes_cbor_binary_frames() {
        let msg = ServerMessage::ReloadAttached;
        let bin = serde_cbor::to_vec(&msg).unwrap();
        let decoded = ServerMessage::decode(&Message::Binary(bin.into())).unwrap();
        assert!(matches!(decoded, ServerMessage::ReloadAttached));
    }

    #[test]
    fn control_frames_decode_to_none() {
        assert!(ServerMessage::decode(&Message::Ping(vec![].into())).is_none());
    }
}
