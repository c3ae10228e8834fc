use std::convert::Infallible;

use uuid::Uuid;
use warp::sse::Event;

use crate::llm::StreamEvent;

/// Create a session SSE event announcing which session the reply belongs to
pub fn create_session_event(session_id: Uuid) -> Result<Event, Infallible> {
    let payload = serde_json::json!({ "session_id": session_id });

    Ok(Event::default()
        .event("session")
        .data(payload.to_string()))
}

/// Create a fragment SSE event carrying a piece of the reply
pub fn create_fragment_event(text: &str) -> Result<Event, Infallible> {
    let payload = serde_json::json!({ "text": text });

    Ok(Event::default()
        .event("fragment")
        .data(payload.to_string()))
}

/// Create an error SSE event
pub fn create_error_event(kind: &str, message: &str) -> Result<Event, Infallible> {
    let payload = serde_json::json!({
        "kind": kind,
        "message": message
    });

    Ok(Event::default()
        .event("error")
        .data(payload.to_string()))
}

/// Create a done SSE event to signal stream completion
pub fn create_done_event() -> Result<Event, Infallible> {
    let payload = serde_json::json!({});

    Ok(Event::default().event("done").data(payload.to_string()))
}

/// Map a relay event onto its SSE form
pub fn event_for(event: &StreamEvent) -> Result<Event, Infallible> {
    match event {
        StreamEvent::Fragment { text } => create_fragment_event(text),
        StreamEvent::Error { kind, message } => create_error_event(kind.as_str(), message),
        StreamEvent::End => create_done_event(),
    }
}
