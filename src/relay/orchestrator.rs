//! Model dispatch and the chat turn state machine

use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::llm::{
    core::config::clamp_token_budget, generate, EventStream, GenerateRequest, GenerationConfig,
    Message, ModelDescriptor, ModelRegistry, ProviderRegistry, StreamEvent,
};
use crate::store::ChatStore;

use super::aggregator::{aggregate, ReplySink};
use super::RelayError;

/// One relay call
#[derive(Debug, Clone)]
pub struct RelayRequest {
    /// Session the reply is persisted to
    pub session_id: Uuid,
    /// Conversation so far, oldest first, including the new user message
    pub history: Vec<Message>,
    /// Registry key of the model to call
    pub model: String,
    /// Requested parameters; the token budget is clamped to the model limit
    pub config: GenerationConfig,
    pub stream: bool,
}

/// What the caller gets back
pub enum RelayOutput {
    /// Events as they arrive, closed by `StreamEvent::End`
    Stream(EventStream),
    /// The whole reply text, error sentinel included when the call failed
    Complete(String),
}

impl std::fmt::Debug for RelayOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayOutput::Stream(_) => f.write_str("Stream(..)"),
            RelayOutput::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
        }
    }
}

/// Dispatches chat turns to providers and persists the replies
#[derive(Clone)]
pub struct Relay {
    models: ModelRegistry,
    providers: ProviderRegistry,
    store: Arc<dyn ChatStore>,
}

impl Relay {
    pub fn new(models: ModelRegistry, providers: ProviderRegistry, store: Arc<dyn ChatStore>) -> Self {
        Self {
            models,
            providers,
            store,
        }
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Resolve a model key; the only input check the relay performs
    pub fn validate(&self, model_key: &str) -> Result<&ModelDescriptor, RelayError> {
        self.models
            .get(model_key)
            .ok_or_else(|| RelayError::UnknownModel {
                model: model_key.to_string(),
                available: self.models.keys(),
            })
    }

    /// Token budget actually sent for a model
    pub fn clamp_token_budget(&self, requested: u32, model: &ModelDescriptor) -> u32 {
        clamp_token_budget(requested, model.max_tokens)
    }

    /// Run one chat turn against the provider serving `request.model`
    ///
    /// Unknown models are rejected before anything is sent or stored. Past
    /// that point every failure travels as an event, and the assistant reply
    /// is persisted exactly once whichever way the call ends.
    pub async fn relay(
        &self,
        request: RelayRequest,
        cancel: CancellationToken,
    ) -> Result<RelayOutput, RelayError> {
        let events = self.dispatch(&request, cancel.clone())?;
        let sink = ReplySink {
            store: self.store.clone(),
            session_id: request.session_id,
            model: request.model.clone(),
        };
        let relayed = aggregate(events, sink, cancel);

        if request.stream {
            return Ok(RelayOutput::Stream(relayed));
        }

        let events: Vec<StreamEvent> = relayed.collect().await;
        Ok(RelayOutput::Complete(collect_text(&events)))
    }

    /// Append the user's message, load the history and relay it
    ///
    /// The model is validated first so an unknown key leaves the session
    /// untouched.
    pub async fn chat_turn(
        &self,
        session_id: Uuid,
        user_message: String,
        model: &str,
        config: GenerationConfig,
        stream: bool,
        cancel: CancellationToken,
    ) -> Result<RelayOutput, RelayError> {
        self.validate(model)?;

        self.store
            .append_message(session_id, &Message::user(user_message))
            .await?;
        let history = self.store.load_history(session_id, None).await?;

        self.relay(
            RelayRequest {
                session_id,
                history,
                model: model.to_string(),
                config,
                stream,
            },
            cancel,
        )
        .await
    }

    fn dispatch(
        &self,
        request: &RelayRequest,
        cancel: CancellationToken,
    ) -> Result<EventStream, RelayError> {
        let model = *self.validate(&request.model)?;
        let provider = self
            .providers
            .get(model.provider)
            .ok_or(RelayError::ProviderUnavailable(model.provider))?;

        let config = GenerationConfig {
            max_tokens: self.clamp_token_budget(request.config.max_tokens, &model),
            temperature: request.config.temperature,
        };

        tracing::info!(
            session_id = %request.session_id,
            model = model.key,
            provider = %model.provider,
            max_tokens = config.max_tokens,
            stream = request.stream,
            "dispatching chat turn"
        );

        Ok(generate(
            provider,
            GenerateRequest {
                messages: request.history.clone(),
                model,
                config,
                stream: request.stream,
            },
            cancel,
        ))
    }
}

/// Concatenated text of a finished event sequence
pub fn collect_text(events: &[StreamEvent]) -> String {
    events.iter().filter_map(StreamEvent::as_text).collect()
}
