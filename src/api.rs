use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::dispatch::Dispatcher;
use crate::odds::Sport;
use crate::store::{AggregateStore, StoreSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<AggregateStore>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            store: Arc::new(AggregateStore::new()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/sports", get(list_sports))
        .route("/runs", post(start_run))
        .route("/state", get(current_state))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct SportOut {
    id: &'static str,
    label: &'static str,
    placeholder: &'static str,
}

async fn list_sports() -> Json<Vec<SportOut>> {
    Json(
        Sport::ALL
            .iter()
            .map(|s| SportOut {
                id: s.id(),
                label: s.label(),
                placeholder: s.placeholder(),
            })
            .collect(),
    )
}

#[derive(serde::Deserialize)]
struct RunReq {
    sport: String,
    #[serde(rename = "match")]
    match_name: String,
}

#[derive(serde::Serialize)]
struct RunStarted {
    generation: u64,
    sport: Sport,
    #[serde(rename = "match")]
    match_name: String,
    sources: Vec<String>,
}

#[derive(serde::Serialize)]
struct ErrorOut {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorOut>);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorOut { error: msg.into() }),
    )
}

/// Start a run in the background; progress is read from `/state`.
async fn start_run(
    State(state): State<AppState>,
    Json(body): Json<RunReq>,
) -> Result<(StatusCode, Json<RunStarted>), ApiError> {
    let sport: Sport = body.sport.parse().map_err(|e| bad_request(format!("{e}")))?;
    let match_name = body.match_name.trim().to_string();
    if match_name.is_empty() {
        return Err(bad_request("match must not be empty"));
    }

    let generation = state.store.begin_run();
    info!(target: "api", generation, %sport, "run requested");

    let dispatcher = state.dispatcher.clone();
    let store = state.store.clone();
    let m = match_name.clone();
    tokio::spawn(async move {
        dispatcher.dispatch(&store, generation, sport, &m).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(RunStarted {
            generation,
            sport,
            match_name,
            sources: state
                .dispatcher
                .sources()
                .iter()
                .map(|s| s.name.clone())
                .collect(),
        }),
    ))
}

async fn current_state(State(state): State<AppState>) -> Json<StoreSnapshot> {
    Json(state.store.snapshot())
}
