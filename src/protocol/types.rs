//! Event, dialog and manifest types carried inside an Open Floor envelope.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// MIME type used for text features.
pub const TEXT_MIME_TYPE: &str = "text/plain";

/// Name of the only dialog feature this agent interprets.
pub const TEXT_FEATURE: &str = "text";

/// Addressing for an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct To {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
}

impl To {
    /// Address an event to a single speaker.
    pub fn speaker(speaker_uri: impl Into<String>) -> Self {
        Self {
            speaker_uri: Some(speaker_uri.into()),
            ..Default::default()
        }
    }
}

/// Event tagged by its `eventType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum Event {
    #[serde(rename = "utterance")]
    Utterance(UtteranceEvent),
    #[serde(rename = "getManifests")]
    GetManifests(GetManifestsEvent),
    #[serde(rename = "publishManifests")]
    PublishManifests(PublishManifestsEvent),
    /// Any event kind this agent does not handle. Never emitted.
    #[serde(other)]
    Other,
}

impl Event {
    /// Wire name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Utterance(_) => "utterance",
            Event::GetManifests(_) => "getManifests",
            Event::PublishManifests(_) => "publishManifests",
            Event::Other => "other",
        }
    }

    /// Recipient of the event, if addressed.
    pub fn to(&self) -> Option<&To> {
        match self {
            Event::Utterance(e) => e.to.as_ref(),
            Event::GetManifests(e) => e.to.as_ref(),
            Event::PublishManifests(e) => e.to.as_ref(),
            Event::Other => None,
        }
    }
}

impl From<UtteranceEvent> for Event {
    fn from(event: UtteranceEvent) -> Self {
        Event::Utterance(event)
    }
}

impl From<PublishManifestsEvent> for Event {
    fn from(event: PublishManifestsEvent) -> Self {
        Event::PublishManifests(event)
    }
}

/// An utterance: one turn of dialog from a speaker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtteranceEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<To>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub parameters: UtteranceParameters,
}

impl UtteranceEvent {
    /// Utterance carrying `dialog_event`, optionally addressed.
    pub fn new(dialog_event: DialogEvent, to: Option<To>) -> Self {
        Self {
            to,
            reason: None,
            parameters: UtteranceParameters {
                dialog_event: Some(DialogEventSlot::Parsed(dialog_event)),
            },
        }
    }

    /// The typed dialog event, if one was sent in a recognized shape.
    pub fn dialog_event(&self) -> Option<&DialogEvent> {
        match &self.parameters.dialog_event {
            Some(DialogEventSlot::Parsed(dialog)) => Some(dialog),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtteranceParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_event: Option<DialogEventSlot>,
}

/// Decoded `dialogEvent` parameter.
///
/// A value that does not decode as a dialog event is kept verbatim instead of
/// failing the whole envelope, so the agent can answer it in-band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DialogEventSlot {
    Parsed(DialogEvent),
    Unrecognized(serde_json::Value),
}

/// Request for the manifests of the addressed agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetManifestsEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<To>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// Answer to `getManifests`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishManifestsEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<To>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub parameters: PublishManifestsParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishManifestsParameters {
    #[serde(default)]
    pub servicing_manifests: Vec<Manifest>,
    #[serde(default)]
    pub discovery_manifests: Vec<Manifest>,
}

/// Dialog payload of an utterance.
///
/// Features are kept as raw JSON; only `text` is decoded, on demand, so an
/// unfamiliar feature never spoils the rest of the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub speaker_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<serde_json::Value>,
    #[serde(default)]
    pub features: BTreeMap<String, serde_json::Value>,
}

impl DialogEvent {
    /// Dialog event with a single `text` feature holding `text`.
    pub fn text(speaker_uri: impl Into<String>, text: impl Into<String>) -> Self {
        let mut features = BTreeMap::new();
        features.insert(
            TEXT_FEATURE.to_string(),
            json!({ "mimeType": TEXT_MIME_TYPE, "tokens": [{ "value": text.into() }] }),
        );
        Self {
            id: None,
            speaker_uri: speaker_uri.into(),
            span: None,
            features,
        }
    }

    /// Decode the `text` feature. `None` when absent or `null`.
    pub fn text_feature(&self) -> Option<Result<Feature, serde_json::Error>> {
        match self.features.get(TEXT_FEATURE) {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(Feature::deserialize(value)),
        }
    }
}

/// One named facet of a dialog event.
///
/// Senders may use either `tokens` or a plain `values` string list; both are
/// folded into `tokens` on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FeatureRepr")]
pub struct Feature {
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    pub tokens: Vec<Token>,
}

impl Feature {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token values joined in order; empty or absent values are skipped.
    pub fn joined_text(&self) -> String {
        self.tokens
            .iter()
            .filter_map(|t| t.value.as_deref())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureRepr {
    #[serde(default = "default_mime_type")]
    mime_type: String,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    tokens: Vec<Token>,
    #[serde(default)]
    values: Vec<String>,
}

fn default_mime_type() -> String {
    TEXT_MIME_TYPE.to_string()
}

impl From<FeatureRepr> for Feature {
    fn from(repr: FeatureRepr) -> Self {
        let mut tokens = repr.tokens;
        tokens.extend(repr.values.into_iter().map(Token::new));
        Self {
            mime_type: repr.mime_type,
            lang: repr.lang,
            encoding: repr.encoding,
            tokens,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            confidence: None,
        }
    }
}

/// Static self-description of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub identification: Identification,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub speaker_uri: String,
    pub service_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversational_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[serde(default)]
    pub keyphrases: Vec<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub supported_layers: SupportedLayers,
}

/// Input/output modality layers, e.g. `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLayers {
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_utterance_decodes_dialog_event() {
        let event: Event = serde_json::from_value(json!({
            "eventType": "utterance",
            "parameters": {
                "dialogEvent": {
                    "speakerUri": "tag:x",
                    "features": {"text": {"mimeType": "text/plain", "tokens": [{"value": "hi"}]}}
                }
            }
        }))
        .unwrap();

        let Event::Utterance(utterance) = event else {
            panic!("expected utterance");
        };
        let dialog = utterance.dialog_event().unwrap();
        assert_eq!(dialog.speaker_uri, "tag:x");
        assert_eq!(dialog.text_feature().unwrap().unwrap().joined_text(), "hi");
    }

    #[test]
    fn test_foreign_features_do_not_spoil_text() {
        let dialog: DialogEvent = serde_json::from_value(json!({
            "speakerUri": "tag:x",
            "features": {
                "text": {"tokens": [{"value": "hi"}]},
                "meta": {"mimeType": "application/json", "tokens": [{"value": {"a": 1}}]},
                "image": "blob"
            }
        }))
        .unwrap();

        assert_eq!(dialog.features.len(), 3);
        assert_eq!(dialog.text_feature().unwrap().unwrap().joined_text(), "hi");
    }

    #[test]
    fn test_text_feature_absent_or_null() {
        let mut dialog = DialogEvent::text("tag:x", "hi");
        dialog
            .features
            .insert(TEXT_FEATURE.to_string(), serde_json::Value::Null);
        assert!(dialog.text_feature().is_none());

        dialog.features.clear();
        assert!(dialog.text_feature().is_none());
    }

    #[test]
    fn test_non_string_text_token_fails_to_decode() {
        let dialog: DialogEvent = serde_json::from_value(json!({
            "speakerUri": "tag:x",
            "features": {"text": {"tokens": [{"value": 42}]}}
        }))
        .unwrap();

        assert!(dialog.text_feature().unwrap().is_err());
    }

    #[test]
    fn test_dialog_event_without_speaker_is_kept_unrecognized() {
        let event: Event = serde_json::from_value(json!({
            "eventType": "utterance",
            "parameters": {"dialogEvent": {"features": {"text": {"tokens": [{"value": "hi"}]}}}}
        }))
        .unwrap();

        let Event::Utterance(utterance) = event else {
            panic!("expected utterance");
        };
        assert!(utterance.dialog_event().is_none());
    }

    #[test]
    fn test_malformed_dialog_event_is_kept_unrecognized() {
        let event: Event = serde_json::from_value(json!({
            "eventType": "utterance",
            "parameters": {"dialogEvent": "not a dialog event"}
        }))
        .unwrap();

        let Event::Utterance(utterance) = event else {
            panic!("expected utterance");
        };
        assert!(utterance.dialog_event().is_none());
        assert!(matches!(
            utterance.parameters.dialog_event,
            Some(DialogEventSlot::Unrecognized(_))
        ));
    }

    #[test]
    fn test_unknown_event_type_decodes_as_other() {
        let event: Event = serde_json::from_value(json!({
            "eventType": "bye",
            "to": {"speakerUri": "tag:y"}
        }))
        .unwrap();
        assert_eq!(event, Event::Other);
        assert_eq!(event.kind(), "other");
    }

    #[test]
    fn test_feature_values_fold_into_tokens() {
        let feature: Feature = serde_json::from_value(json!({
            "values": ["foo", "bar"]
        }))
        .unwrap();

        assert_eq!(feature.mime_type, TEXT_MIME_TYPE);
        assert_eq!(feature.tokens.len(), 2);
        assert_eq!(feature.joined_text(), "foobar");
    }

    #[test]
    fn test_joined_text_skips_empty_tokens() {
        let feature = Feature {
            mime_type: TEXT_MIME_TYPE.to_string(),
            lang: None,
            encoding: None,
            tokens: vec![
                Token::new("hello"),
                Token::default(),
                Token::new(""),
                Token::new(" world"),
            ],
        };
        assert_eq!(feature.joined_text(), "hello world");
    }

    #[test]
    fn test_publish_manifests_serializes_empty_discovery() {
        let event = Event::PublishManifests(PublishManifestsEvent {
            to: Some(To::speaker("tag:x")),
            reason: None,
            parameters: PublishManifestsParameters::default(),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["eventType"], "publishManifests");
        assert_eq!(value["to"]["speakerUri"], "tag:x");
        assert_eq!(value["parameters"]["discoveryManifests"], json!([]));
        assert_eq!(value["parameters"]["servicingManifests"], json!([]));
    }
}
