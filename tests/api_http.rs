// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /sports
// - POST /runs  (validation + background run)
// - GET /state  (snapshot until loading clears)

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use best_bet::api::{self, AppState};
use best_bet::dispatch::Dispatcher;
use best_bet::odds::Source;
use common::{complete_line, odds_json, url_line, Script, ScriptedBackend};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

const DK: &str = "https://sportsbook.draftkings.com";
const FD: &str = "https://sportsbook.fanduel.com";

fn test_state() -> AppState {
    let backend = ScriptedBackend::new()
        .body(
            DK,
            url_line("https://preview.example/dk")
                + &complete_line(odds_json("Chiefs", "Patriots", "-180", "", "+155")),
        )
        .with(FD, Script::Status(500));
    let dispatcher = Dispatcher::new(
        Arc::new(backend),
        vec![Source::new("DraftKings", DK), Source::new("FanDuel", FD)],
    );
    AppState::new(dispatcher)
}

fn test_router(state: &AppState) -> Router {
    api::router(state.clone())
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

fn post_run(payload: Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/runs")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /runs")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let state = test_state();
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = test_router(&state).oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8"), "ok");
}

#[tokio::test]
async fn api_sports_lists_picker_entries() {
    let state = test_state();
    let req = Request::builder()
        .uri("/sports")
        .body(Body::empty())
        .expect("build GET /sports");

    let resp = test_router(&state).oneshot(req).await.expect("oneshot /sports");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let arr = v.as_array().expect("array");
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[1]["id"], "soccer");
    assert_eq!(arr[1]["placeholder"], "Man United vs. Chelsea");
}

#[tokio::test]
async fn api_runs_rejects_empty_match_and_unknown_sport() {
    let state = test_state();

    let resp = test_router(&state)
        .oneshot(post_run(json!({ "sport": "football", "match": "   " })))
        .await
        .expect("oneshot /runs");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(resp).await.get("error").is_some());

    let resp = test_router(&state)
        .oneshot(post_run(json!({ "sport": "curling", "match": "A vs. B" })))
        .await
        .expect("oneshot /runs");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // nothing was started
    assert_eq!(state.store.generation(), 0);
}

#[tokio::test]
async fn api_run_completes_and_state_shows_both_maps() {
    let state = test_state();

    let resp = test_router(&state)
        .oneshot(post_run(json!({ "sport": "football", "match": "Chiefs vs. Patriots" })))
        .await
        .expect("oneshot /runs");
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let started = read_json(resp).await;
    assert_eq!(started["generation"], 1);
    assert_eq!(started["sources"], json!(["DraftKings", "FanDuel"]));

    // poll /state until every source settled
    let mut snap = Json::Null;
    for _ in 0..200 {
        let req = Request::builder()
            .uri("/state")
            .body(Body::empty())
            .expect("build GET /state");
        let resp = test_router(&state).oneshot(req).await.expect("oneshot /state");
        assert_eq!(resp.status(), StatusCode::OK);
        snap = read_json(resp).await;
        if snap["loading"] == false {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(snap["loading"], false, "run should settle");
    assert_eq!(snap["streaming"], json!({}));
    assert_eq!(snap["results"]["DraftKings"]["success"], true);
    assert_eq!(
        snap["results"]["DraftKings"]["payload"]["betting_odds"]["home_wins"],
        "-180"
    );
    assert_eq!(snap["results"]["FanDuel"]["success"], false);
    assert_eq!(snap["results"]["FanDuel"]["payload"]["error"], "Network Error");
    assert_eq!(snap["results"]["FanDuel"]["payload"]["reason"], "Failed to connect");
}
