// Route definitions

use std::convert::Infallible;

use uuid::Uuid;
use warp::Filter;

use crate::handlers;
use crate::models::HistoryQuery;
use crate::state::AppState;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn authorization() -> impl Filter<Extract = (Option<String>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization")
}

pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    // GET /
    let root = warp::path::end()
        .and(warp::get())
        .and_then(handlers::root_handler);

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::health_handler);

    // GET /api/v1/models
    let models = api
        .and(warp::path("models"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::models_handler);

    // POST /api/v1/chat
    let chat = api
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(authorization())
        .and(warp::body::json())
        .and_then(handlers::chat_handler);

    // GET /api/v1/sessions/{sessionId}/messages
    let history = api
        .and(warp::path("sessions"))
        .and(warp::path::param::<Uuid>())
        .and(warp::path("messages"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and(authorization())
        .and(warp::query::<HistoryQuery>())
        .and_then(handlers::history_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST"]);

    // Combine routes
    root.or(health)
        .or(models)
        .or(chat)
        .or(history)
        .with(cors)
}
