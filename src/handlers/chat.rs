// POST /api/v1/chat handler

use futures_util::future;
use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

use super::{accessible_session, internal_error, json_error, resolve_user};
use crate::llm::{EventStream, GenerationConfig, StreamEvent};
use crate::models::{ChatRequest, ChatResponse};
use crate::relay::{RelayError, RelayOutput};
use crate::sse::{create_session_event, event_for};
use crate::state::AppState;
use crate::store::DEFAULT_SESSION_TITLE;

const EVENT_BUFFER: usize = 32;

pub async fn chat_handler(
    state: AppState,
    authorization: Option<String>,
    request: ChatRequest,
) -> Result<Response, warp::Rejection> {
    Ok(handle_chat(state, authorization, request)
        .await
        .unwrap_or_else(|response| response))
}

async fn handle_chat(
    state: AppState,
    authorization: Option<String>,
    request: ChatRequest,
) -> Result<Response, Response> {
    // Reject unknown models before touching identity or storage
    state
        .relay
        .validate(&request.model)
        .map_err(|err| json_error(StatusCode::BAD_REQUEST, err.to_string()))?;

    let user = resolve_user(&state, authorization).await?;

    let session_id = match request.session_id {
        Some(session_id) => accessible_session(&state, session_id, user).await?,
        None => {
            state
                .store
                .create_session(user, DEFAULT_SESSION_TITLE)
                .await
                .map_err(internal_error)?
                .id
        }
    };

    let cancel = CancellationToken::new();
    let config = GenerationConfig::new(request.max_tokens).with_temperature(request.temperature);
    let output = state
        .relay
        .chat_turn(
            session_id,
            request.message,
            &request.model,
            config,
            request.stream,
            cancel.clone(),
        )
        .await
        .map_err(|err| match err {
            RelayError::UnknownModel { .. } => json_error(StatusCode::BAD_REQUEST, err.to_string()),
            other => internal_error(other),
        })?;

    match output {
        RelayOutput::Stream(events) => {
            let body = forward_events(events, cancel).map(|event| event_for(&event));
            let sse_stream =
                stream::once(future::ready(create_session_event(session_id))).chain(body);

            Ok(warp::sse::reply(warp::sse::keep_alive().stream(sse_stream)).into_response())
        }
        RelayOutput::Complete(response) => Ok(warp::reply::json(&ChatResponse {
            response,
            model: request.model,
            session_id,
            timestamp: chrono::Utc::now(),
        })
        .into_response()),
    }
}

/// Drive the relay on its own task and hand its events over a channel
///
/// When the client goes away the receiver is dropped, which cancels the
/// upstream call; the relay is still drained so the partial reply is stored.
fn forward_events(mut events: EventStream, cancel: CancellationToken) -> ReceiverStream<StreamEvent> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    tokio::spawn(async move {
        loop {
            let next = tokio::select! {
                _ = tx.closed() => None,
                event = events.next() => Some(event),
            };

            match next {
                Some(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Some(None) => return,
                None => break,
            }
        }

        tracing::debug!("client disconnected; cancelling relay");
        cancel.cancel();
        while events.next().await.is_some() {}
    });

    ReceiverStream::new(rx)
}
