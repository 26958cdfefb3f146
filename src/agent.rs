//! The parrot agent: echoes text utterances back with a 🦜 prefix.

use serde_json::Value;
use thiserror::Error;

use crate::config::AgentSettings;
use crate::protocol::{
    Capability, DialogEvent, DialogEventSlot, Envelope, Event, GetManifestsEvent, Identification,
    Manifest, PublishManifestsEvent, PublishManifestsParameters, Sender, SupportedLayers, To,
    UtteranceEvent,
};

/// Prefix put in front of every echoed message.
pub const PARROT_PREFIX: &str = "🦜 ";

/// Reasons an utterance could not be echoed.
///
/// None of these escape `process_envelope`; each becomes an error utterance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("utterance carries no valid dialog event")]
    MissingDialogEvent,

    #[error("dialog event has no text feature")]
    MissingTextFeature,

    #[error("internal handler error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Text of the error utterance sent back for this error.
    pub fn reply_text(&self) -> &'static str {
        match self {
            HandlerError::MissingDialogEvent => "*chirp* I didn't receive a valid dialog event!",
            HandlerError::MissingTextFeature => "*chirp* I can only repeat text messages!",
            HandlerError::Internal(_) => {
                "*confused chirp* Something went wrong while trying to repeat that!"
            }
        }
    }
}

/// Agent that repeats whatever text it hears.
///
/// Immutable once built; share it behind an `Arc` across requests.
#[derive(Debug, Clone)]
pub struct ParrotAgent {
    manifest: Manifest,
}

impl ParrotAgent {
    pub fn new(manifest: Manifest) -> Self {
        tracing::info!(
            "🦜 Parrot agent initialized with speaker URI: {}",
            manifest.identification.speaker_uri
        );
        Self { manifest }
    }

    /// Build an agent from configured identity settings.
    pub fn from_settings(settings: &AgentSettings) -> Self {
        create_parrot_agent(
            &settings.speaker_uri,
            &settings.service_url,
            &settings.name,
            &settings.organization,
            &settings.description,
        )
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn speaker_uri(&self) -> &str {
        &self.manifest.identification.speaker_uri
    }

    fn sender(&self) -> Sender {
        Sender::new(
            self.speaker_uri(),
            Some(self.manifest.identification.service_url.clone()),
        )
    }

    /// Handle every event of `inbound` and collect the replies.
    ///
    /// Produces one outbound event per utterance or manifest request, in
    /// inbound order. Other event kinds are skipped.
    pub fn process_envelope(&self, inbound: &Envelope) -> Envelope {
        let mut outbound = inbound.reply(self.sender());

        for event in &inbound.events {
            tracing::debug!(
                "Dispatching {} event from {}",
                event.kind(),
                inbound.sender.speaker_uri
            );

            match event {
                Event::Utterance(utterance) => {
                    match self.on_utterance(utterance, inbound) {
                        Ok(reply) => outbound.push(reply),
                        Err(e) => {
                            tracing::warn!(
                                "Utterance from {} not echoed: {}",
                                inbound.sender.speaker_uri,
                                e
                            );
                            self.send_error_response(e.reply_text(), &mut outbound);
                        }
                    }
                }
                Event::GetManifests(request) => {
                    outbound.push(self.on_get_manifests(request, inbound));
                }
                Event::PublishManifests(_) | Event::Other => {
                    tracing::debug!("Ignoring {} event", event.kind());
                }
            }
        }

        outbound
    }

    /// Echo the text of an utterance back to its sender.
    pub fn on_utterance(
        &self,
        event: &UtteranceEvent,
        inbound: &Envelope,
    ) -> Result<Event, HandlerError> {
        let dialog = match &event.parameters.dialog_event {
            Some(DialogEventSlot::Parsed(dialog)) => dialog,
            // An object that looked like a dialog event but would not decode.
            Some(DialogEventSlot::Unrecognized(Value::Object(fields))) if !fields.is_empty() => {
                let reason = serde_json::from_value::<DialogEvent>(Value::Object(fields.clone()))
                    .err()
                    .map_or_else(|| "undecodable dialog event".to_string(), |e| e.to_string());
                return Err(HandlerError::Internal(reason));
            }
            _ => return Err(HandlerError::MissingDialogEvent),
        };

        let text = dialog
            .text_feature()
            .ok_or(HandlerError::MissingTextFeature)?
            .map_err(|e| HandlerError::Internal(format!("text feature: {}", e)))?;
        if text.is_empty() {
            return Err(HandlerError::MissingTextFeature);
        }

        let parrot_text = format!("{}{}", PARROT_PREFIX, text.joined_text());
        tracing::info!("🦜 Echoing back: {}", parrot_text);

        let response = DialogEvent::text(self.speaker_uri(), parrot_text);
        Ok(UtteranceEvent::new(response, Some(To::speaker(&inbound.sender.speaker_uri))).into())
    }

    /// Publish this agent's manifest to the requester.
    pub fn on_get_manifests(&self, _event: &GetManifestsEvent, inbound: &Envelope) -> Event {
        tracing::info!("🦜 Sending manifest to {}", inbound.sender.speaker_uri);

        PublishManifestsEvent {
            to: Some(To::speaker(&inbound.sender.speaker_uri)),
            reason: None,
            parameters: PublishManifestsParameters {
                servicing_manifests: vec![self.manifest.clone()],
                discovery_manifests: Vec::new(),
            },
        }
        .into()
    }

    /// Append an unaddressed utterance carrying `message`.
    pub fn send_error_response(&self, message: &str, outbound: &mut Envelope) {
        let dialog = DialogEvent::text(self.speaker_uri(), message);
        outbound.push(UtteranceEvent::new(dialog, None).into());
    }

}

/// Build a parrot agent with its standard capability set.
pub fn create_parrot_agent(
    speaker_uri: &str,
    service_url: &str,
    name: &str,
    organization: &str,
    description: &str,
) -> ParrotAgent {
    let identification = Identification {
        speaker_uri: speaker_uri.to_string(),
        service_url: service_url.to_string(),
        organization: Some(organization.to_string()),
        conversational_name: Some(name.to_string()),
        department: None,
        role: None,
        synopsis: Some(description.to_string()),
    };

    let capability = Capability {
        keyphrases: ["echo", "repeat", "parrot", "say"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        descriptions: vec![
            format!("Echoes back any text message with a {}emoji", PARROT_PREFIX),
            "Repeats user input verbatim".to_string(),
            "Simple text mirroring functionality".to_string(),
        ],
        languages: Vec::new(),
        supported_layers: SupportedLayers {
            input: vec!["text".to_string()],
            output: vec!["text".to_string()],
        },
    };

    ParrotAgent::new(Manifest {
        identification,
        capabilities: vec![capability],
    })
}
