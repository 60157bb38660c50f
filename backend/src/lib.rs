use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use fair_share_core::{GameResultInput, GameResultRecord};
use serde_json::json;
use tracing::{debug, error, info, warn};

pub mod archive;
pub mod client;
pub mod config;

pub use archive::{ArchiveError, ResultArchive};
pub use client::{ClientError, HttpArchiveClient, RESULTS_PATH};
pub use config::{Config, ConfigError};

const INVALID_RESULT_MESSAGE: &str = "Invalid game result data";
const FETCH_FAILED_MESSAGE: &str = "Failed to fetch game results";

#[derive(Clone)]
pub struct AppState {
    archive: Arc<ResultArchive>,
}

impl AppState {
    pub fn new(archive: Arc<ResultArchive>) -> Self {
        Self { archive }
    }

    pub fn archive(&self) -> &ResultArchive {
        &self.archive
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(RESULTS_PATH, get(list_results).post(submit_result))
        .with_state(state)
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn invalid_result() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: INVALID_RESULT_MESSAGE,
        }
    }

    fn fetch_failed() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: FETCH_FAILED_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

async fn submit_result(
    State(state): State<AppState>,
    payload: Result<Json<GameResultInput>, JsonRejection>,
) -> Result<Json<GameResultRecord>, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        warn!(%rejection, "rejected game result");
        ApiError::invalid_result()
    })?;

    let record = state.archive.save(input).map_err(|err| {
        error!(%err, "failed to store game result");
        ApiError::invalid_result()
    })?;
    info!(id = %record.id, "stored game result");

    Ok(Json(record))
}

async fn list_results(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameResultRecord>>, ApiError> {
    let records = state.archive.list().map_err(|err| {
        error!(%err, "failed to list game results");
        ApiError::fetch_failed()
    })?;
    debug!(count = records.len(), "listing game results");
    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use fair_share_core::{
        GameSession, HomeType, HouseholdConditions, MemoryStore, ParticipantRef, Route,
    };
    use http_body_util::BodyExt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn json_body(res: Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn test_app() -> (Router, AppState) {
        let state = AppState::new(Arc::new(ResultArchive::new()));
        (app(state.clone()), state)
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(RESULTS_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_results() -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(RESULTS_PATH)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn submit_returns_stored_record_with_defaults() {
        let (app, state) = test_app();
        let res = app
            .clone()
            .oneshot(post_json(json!({
                "participant1Name": "Ann",
                "participant2Name": "Bo",
                "homeType": "apartment",
                "participant1Tasks": 7
            })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert!(body["id"].as_str().is_some());
        assert!(body["completedAt"].as_str().is_some());
        assert_eq!(body["participant1Name"], "Ann");
        assert_eq!(body["homeType"], "apartment");
        assert_eq!(body["participant1Tasks"], 7);
        assert_eq!(body["participant2Tasks"], 0);
        assert_eq!(body["togetherTasks"], 0);
        assert_eq!(body["hasChildren"], false);
        assert_eq!(body["hasPets"], false);
        assert_eq!(body["hasCar"], false);
        assert_eq!(state.archive().len().unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_name_is_rejected_without_writing() {
        let (app, state) = test_app();
        let res = app
            .clone()
            .oneshot(post_json(json!({
                "participant2Name": "Bo",
                "homeType": "house"
            })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await,
            json!({ "message": "Invalid game result data" })
        );
        assert!(state.archive().is_empty().unwrap());
    }

    #[tokio::test]
    async fn malformed_payloads_get_the_generic_message() {
        let (app, state) = test_app();

        let wrong_type = post_json(json!({
            "participant1Name": "Ann",
            "participant2Name": "Bo",
            "homeType": "house",
            "hasCar": "yes"
        }));
        let not_json = Request::builder()
            .method(Method::POST)
            .uri(RESULTS_PATH)
            .header("content-type", "application/json")
            .body(Body::from("{\"participant1Name\":"))
            .unwrap();
        let no_content_type = Request::builder()
            .method(Method::POST)
            .uri(RESULTS_PATH)
            .body(Body::from("{}"))
            .unwrap();

        for req in [wrong_type, not_json, no_content_type] {
            let res = app.clone().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(res).await["message"], INVALID_RESULT_MESSAGE);
        }
        assert!(state.archive().is_empty().unwrap());
    }

    #[tokio::test]
    async fn float_and_negative_counters_are_rejected() {
        let (app, state) = test_app();
        for counter in [json!(3.0), json!(-1)] {
            let res = app
                .clone()
                .oneshot(post_json(json!({
                    "participant1Name": "Ann",
                    "participant2Name": "Bo",
                    "homeType": "house",
                    "participant2Tasks": counter
                })))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(res).await["message"], INVALID_RESULT_MESSAGE);
        }
        assert!(state.archive().is_empty().unwrap());
    }

    #[tokio::test]
    async fn broken_archive_fails_reads_and_writes() {
        let (app, state) = test_app();
        state.archive().poison();

        let res = app.clone().oneshot(get_results()).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(res).await,
            json!({ "message": "Failed to fetch game results" })
        );

        let res = app
            .clone()
            .oneshot(post_json(json!({
                "participant1Name": "Ann",
                "participant2Name": "Bo",
                "homeType": "house",
                "togetherTasks": 4
            })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await,
            json!({ "message": "Invalid game result data" })
        );
        assert!(state.archive().is_empty().is_err());
    }

    #[tokio::test]
    async fn repeated_reads_return_the_same_record() {
        let (app, _) = test_app();
        let created = json_body(
            app.clone()
                .oneshot(post_json(json!({
                    "participant1Name": "Ann",
                    "participant2Name": "Bo",
                    "homeType": "house",
                    "hasPets": true
                })))
                .await
                .unwrap(),
        )
        .await;

        let first = json_body(app.clone().oneshot(get_results()).await.unwrap()).await;
        let second = json_body(app.clone().oneshot(get_results()).await.unwrap()).await;

        let first = first.as_array().unwrap();
        let second = second.as_array().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0]["id"], created["id"]);
        assert_eq!(second[0]["id"], created["id"]);
        assert_eq!(first[0]["hasPets"], true);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_empty_at_start() {
        let (app, _) = test_app();
        let res = app.clone().oneshot(get_results()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!([]));

        for name in ["first", "second", "third"] {
            let res = app
                .clone()
                .oneshot(post_json(json!({
                    "participant1Name": name,
                    "participant2Name": "Bo",
                    "homeType": ""
                })))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let listed = json_body(app.clone().oneshot(get_results()).await.unwrap()).await;
        let names: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["participant1Name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn finished_session_is_archived_over_http() {
        let (server_app, state) = test_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, server_app).await.unwrap();
        });

        let client = HttpArchiveClient::new(&format!("http://{addr}/")).unwrap();
        assert_eq!(client.endpoint(), format!("http://{addr}{RESULTS_PATH}"));

        let mut session = GameSession::with_rng(
            MemoryStore::new(),
            client,
            ChaCha8Rng::seed_from_u64(21),
        );
        session.begin(
            "Ann",
            "Bo",
            HouseholdConditions {
                home_type: HomeType::House,
                has_car: true,
                ..HouseholdConditions::default()
            },
        );
        let mut next = Route::Game;
        while next == Route::Game {
            next = session.assign(ParticipantRef::Together).unwrap().next;
        }
        assert_eq!(next, Route::Results);

        let mut archived = Vec::new();
        for _ in 0..100 {
            archived = state.archive().list().unwrap();
            if !archived.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].participant1_name, "Ann");
        assert_eq!(archived[0].home_type, "house");
        assert!(archived[0].has_car);
        assert_eq!(archived[0].together_tasks, 17 + 16 + 2 + 3);
        assert_eq!(archived[0].participant1_tasks, 0);
    }

    #[tokio::test]
    async fn unreachable_archive_does_not_block_the_game() {
        // nothing listens on this port once the listener is dropped
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpArchiveClient::new(&format!("http://{addr}")).unwrap();
        let mut session = GameSession::with_rng(
            MemoryStore::new(),
            client,
            ChaCha8Rng::seed_from_u64(2),
        );
        session.begin("Ann", "Bo", HouseholdConditions::default());
        while !session.state().is_complete() {
            session.assign(ParticipantRef::Participant1).unwrap();
        }
        let view = session.enter_results().unwrap();
        assert_eq!(view.summary.p1_percent, 100);
    }
}
