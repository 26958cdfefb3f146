//! Open Floor protocol data types.
//!
//! This module defines the typed wire format exchanged between agents:
//! - Envelopes and the `{openFloor: ...}` payload wrapper
//! - Events tagged by `eventType` (utterance, getManifests, publishManifests)
//! - Dialog events and their features
//! - Agent manifests

pub mod envelope;
pub mod types;

pub use envelope::{Conversation, Envelope, Payload, Schema, Sender, PROTOCOL_VERSION};
pub use types::{
    Capability, DialogEvent, DialogEventSlot, Event, Feature, GetManifestsEvent, Identification,
    Manifest, PublishManifestsEvent, PublishManifestsParameters, SupportedLayers, To, Token,
    UtteranceEvent, UtteranceParameters, TEXT_FEATURE, TEXT_MIME_TYPE,
};
