use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use accord_common::{AccordError, Phase, Value, VoteMessage};
use accord_consensus::{ConsensusNode, NodeStatus, Progress};

#[derive(Clone)]
pub struct AppState {
    pub node: Arc<ConsensusNode>,
}

/// Inbound body of `POST /message`. The phase arrives as a raw string so an
/// unrecognized phase surfaces as a protocol error instead of a decode
/// failure.
#[derive(Deserialize)]
struct MessageDto {
    round: u64,
    value: Value,
    phase: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/getState", get(get_state))
        .route("/message", post(post_message))
        .route("/start", get(get_start))
        .route("/stop", get(get_stop))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
}

async fn get_status(State(state): State<AppState>) -> Response {
    match state.node.status() {
        NodeStatus::Live => (StatusCode::OK, "live").into_response(),
        NodeStatus::Faulty => (StatusCode::INTERNAL_SERVER_ERROR, "faulty").into_response(),
    }
}

async fn get_state(State(state): State<AppState>) -> Response {
    Json(state.node.state().await).into_response()
}

async fn post_message(State(state): State<AppState>, Json(dto): Json<MessageDto>) -> Response {
    let phase = match dto.phase.parse::<Phase>() {
        Ok(phase) => phase,
        Err(e) => return error_response(e),
    };
    let msg = VoteMessage {
        round: dto.round,
        value: dto.value,
        phase,
    };

    match state.node.receive(msg).await {
        Ok(progress) => {
            let message = match progress {
                Progress::Pending => "Vote accepted, quorum pending".to_string(),
                Progress::FinalVote(_) => "Decision phase completed".to_string(),
                Progress::NextRound(next) => {
                    format!("Final phase completed, round {} started", next.round)
                }
                Progress::Decided(value) => format!("Decision reached: {}", value),
            };
            (StatusCode::OK, Json(MessageResponse { message })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn get_start(State(state): State<AppState>) -> Response {
    match state.node.start().await {
        Ok(()) => (StatusCode::OK, "Consensus algorithm initiated.").into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_stop(State(state): State<AppState>) -> Response {
    let id = state.node.id();
    state.node.stop().await;
    (StatusCode::OK, format!("Node {} has been stopped.", id)).into_response()
}

fn error_response(err: AccordError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse {
            message: err.to_string(),
        }),
    )
        .into_response()
}
