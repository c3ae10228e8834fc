// Handlers module

pub mod chat;
pub mod history;
pub mod service;

pub use chat::chat_handler;
pub use history::history_handler;
pub use service::{health_handler, models_handler, root_handler};

use uuid::Uuid;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

use crate::auth::parse_bearer;
use crate::models::ErrorResponse;
use crate::state::AppState;
use crate::store::{self, can_access};

/// JSON `{"detail": ...}` body with a status code
pub(crate) fn json_error(status: StatusCode, detail: impl Into<String>) -> Response {
    let body = ErrorResponse {
        detail: detail.into(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

pub(crate) fn internal_error(err: impl std::fmt::Display) -> Response {
    tracing::error!(error = %err, "request failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Resolve the caller from an optional `Authorization` header
///
/// No header means an anonymous caller. A header that does not verify is
/// rejected rather than downgraded to anonymous.
pub(crate) async fn resolve_user(
    state: &AppState,
    authorization: Option<String>,
) -> Result<Option<Uuid>, Response> {
    let Some(header) = authorization else {
        return Ok(None);
    };

    let unauthorized = |err: crate::auth::AuthError| json_error(StatusCode::UNAUTHORIZED, err.to_string());
    let token = parse_bearer(&header).map_err(unauthorized)?;
    let identity = state.verifier.verify(token).await.map_err(unauthorized)?;

    let user_id = state
        .store
        .upsert_user(&identity.to_profile())
        .await
        .map_err(internal_error)?;
    Ok(Some(user_id))
}

/// Check the caller may use a session: 404 when unknown, 403 when owned by
/// someone else
pub(crate) async fn accessible_session(
    state: &AppState,
    session_id: Uuid,
    user: Option<Uuid>,
) -> Result<Uuid, Response> {
    let owner = match state.store.session_owner(session_id).await {
        Ok(owner) => owner,
        Err(store::Error::NotFoundError(_)) => {
            return Err(json_error(StatusCode::NOT_FOUND, "Session not found"))
        }
        Err(err) => return Err(internal_error(err)),
    };

    if !can_access(owner, user) {
        tracing::warn!(session_id = %session_id, "session access denied");
        return Err(json_error(StatusCode::FORBIDDEN, "Access denied to this session"));
    }
    Ok(session_id)
}
