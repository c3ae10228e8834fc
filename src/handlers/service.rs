// Service info, health and model listing

use warp::reply::{Reply, Response};

use crate::models::ModelInfo;
use crate::state::AppState;

pub async fn root_handler() -> Result<Response, warp::Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "message": "LLM Chat API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response())
}

pub async fn health_handler() -> Result<Response, warp::Rejection> {
    Ok(warp::reply::json(&serde_json::json!({ "status": "healthy" })).into_response())
}

pub async fn models_handler(state: AppState) -> Result<Response, warp::Rejection> {
    let models: Vec<ModelInfo> = state.relay.models().iter().map(ModelInfo::from).collect();
    Ok(warp::reply::json(&models).into_response())
}
