// GET /api/v1/sessions/{id}/messages handler

use uuid::Uuid;
use warp::reply::{Reply, Response};

use super::{accessible_session, internal_error, resolve_user};
use crate::models::HistoryQuery;
use crate::state::AppState;

pub async fn history_handler(
    session_id: Uuid,
    state: AppState,
    authorization: Option<String>,
    query: HistoryQuery,
) -> Result<Response, warp::Rejection> {
    Ok(handle_history(session_id, state, authorization, query)
        .await
        .unwrap_or_else(|response| response))
}

async fn handle_history(
    session_id: Uuid,
    state: AppState,
    authorization: Option<String>,
    query: HistoryQuery,
) -> Result<Response, Response> {
    let user = resolve_user(&state, authorization).await?;
    accessible_session(&state, session_id, user).await?;

    let limit = Some(query.limit.max(0));
    let messages = state
        .store
        .load_history(session_id, limit)
        .await
        .map_err(internal_error)?;

    Ok(warp::reply::json(&messages).into_response())
}
