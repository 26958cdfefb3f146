//! Open Floor envelopes and the `{openFloor: ...}` wire payload.

use serde::{Deserialize, Serialize};

use super::types::Event;

/// Protocol version stamped on outbound envelopes.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Top-level wire wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "openFloor")]
    pub open_floor: Envelope,
}

impl Payload {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            open_floor: envelope,
        }
    }
}

/// Message from one speaker carrying an ordered list of events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
    pub sender: Sender,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Envelope {
    /// Empty envelope from `sender`.
    pub fn new(sender: Sender) -> Self {
        Self {
            schema: Some(Schema::current()),
            conversation: None,
            sender,
            events: Vec::new(),
        }
    }

    /// Empty reply to this envelope: same conversation, new sender.
    ///
    /// An inbound envelope without a conversation gets a fresh conversation id.
    pub fn reply(&self, sender: Sender) -> Self {
        let conversation = self
            .conversation
            .clone()
            .unwrap_or_else(Conversation::generate);
        Self {
            conversation: Some(conversation),
            ..Self::new(sender)
        }
    }

    /// Append an event. Events are never removed or reordered.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Schema {
    pub fn current() -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            url: None,
        }
    }
}

/// Conversation the envelope belongs to.
///
/// Only `id` is typed; conversants, persistent state and any other members
/// are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Conversation {
    fn generate() -> Self {
        Self {
            id: Some(format!("conv:{}", uuid::Uuid::new_v4())),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    pub speaker_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
}

impl Sender {
    pub fn new(speaker_uri: impl Into<String>, service_url: Option<String>) -> Self {
        Self {
            speaker_uri: speaker_uri.into(),
            service_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{DialogEvent, To, UtteranceEvent};
    use serde_json::json;

    #[test]
    fn test_bare_envelope_decodes_without_header() {
        let envelope: Envelope = serde_json::from_value(json!({
            "sender": {"speakerUri": "tag:x"},
            "events": [{"eventType": "getManifests"}]
        }))
        .unwrap();

        assert!(envelope.schema.is_none());
        assert!(envelope.conversation.is_none());
        assert_eq!(envelope.sender.speaker_uri, "tag:x");
        assert_eq!(envelope.events.len(), 1);
    }

    #[test]
    fn test_missing_sender_is_rejected() {
        let result = serde_json::from_value::<Envelope>(json!({"events": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_keeps_conversation() {
        let inbound: Envelope = serde_json::from_value(json!({
            "conversation": {"id": "conv:1", "conversants": [{"identification": {}}]},
            "sender": {"speakerUri": "tag:x"}
        }))
        .unwrap();

        let reply = inbound.reply(Sender::new("tag:parrot", None));
        let conversation = reply.conversation.unwrap();
        assert_eq!(conversation.id.as_deref(), Some("conv:1"));
        assert!(conversation.extra.contains_key("conversants"));
        assert_eq!(reply.sender.speaker_uri, "tag:parrot");
        assert_eq!(reply.schema, Some(Schema::current()));
        assert!(reply.events.is_empty());
    }

    #[test]
    fn test_reply_generates_conversation_id() {
        let inbound = Envelope::new(Sender::new("tag:x", None));
        let reply = inbound.reply(Sender::new("tag:parrot", None));
        let id = reply.conversation.and_then(|c| c.id).unwrap();
        assert!(id.starts_with("conv:"));
    }

    #[test]
    fn test_outbound_envelope_survives_encoding() {
        let mut envelope = Envelope::new(Sender::new(
            "tag:parrot",
            Some("http://localhost:8080/".to_string()),
        ));
        envelope.push(
            UtteranceEvent::new(DialogEvent::text("tag:parrot", "🦜 hi"), Some(To::speaker("tag:x")))
                .into(),
        );
        let payload = Payload::new(envelope);

        let encoded = serde_json::to_string(&payload).unwrap();
        assert!(encoded.contains("\"openFloor\""));
        let decoded: Payload = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, payload);
    }
}
