//! Relay between a chat turn and the upstream model
//!
//! The orchestrator picks the provider for a model key, the aggregator
//! forwards its events while accumulating the reply for persistence.

pub mod aggregator;
pub mod orchestrator;

use thiserror::Error;

use crate::llm::ProviderKind;
use crate::store;

pub use aggregator::aggregate;
pub use orchestrator::{Relay, RelayOutput, RelayRequest};

/// Failures reported before any event is produced
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Model '{model}' not available. Available models: {}", .available.join(", "))]
    UnknownModel {
        model: String,
        available: Vec<&'static str>,
    },

    #[error("no provider registered for {0}")]
    ProviderUnavailable(ProviderKind),

    #[error("store error: {0}")]
    Store(#[from] store::Error),
}
