//! Pact-style consumer-driven contract testing
//!
//! - [`Pact`]: the serializable contract document
//! - [`PactRecorder`]: captures interactions during a test run and replays
//!   them as stubbed responses

pub mod model;
pub mod recorder;

pub use model::{
    Interaction, InteractionRequest, InteractionResponse, MatchScope, Pact, PactMetadata,
    PactSpecification, Participant,
};
pub use recorder::PactRecorder;
