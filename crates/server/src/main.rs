use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use shared::{
    domain::CounterState,
    error::{ApiError, ErrorCode},
    protocol::{control_route, display_route, state_route, UpdateAck},
};
use store::CounterStore;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, info};

mod config;

use config::load_settings;

struct AppState {
    store: CounterStore,
}

const MAX_PATCH_BYTES: usize = 16 * 1024;

const CONTROL_PAGE: &str = include_str!("../assets/control.html");
const DISPLAY_PAGE: &str = include_str!("../assets/display.html");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let state = AppState {
        store: CounterStore::default(),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "counter server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(control_route(), get(control_page))
        .route(display_route(), get(display_page))
        .route(state_route(), get(get_state).post(post_state))
        .layer(RequestBodyLimitLayer::new(MAX_PATCH_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn control_page() -> Html<&'static str> {
    Html(CONTROL_PAGE)
}

async fn display_page() -> Html<&'static str> {
    Html(DISPLAY_PAGE)
}

async fn get_state(State(state): State<Arc<AppState>>) -> Json<CounterState> {
    Json(state.store.snapshot())
}

async fn post_state(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<UpdateAck>, (StatusCode, Json<ApiError>)> {
    let patch: serde_json::Value = serde_json::from_slice(&body).map_err(|error| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                format!("body is not valid JSON: {error}"),
            )),
        )
    })?;

    let merged = state.store.merge(&patch);
    debug!(
        successes = merged.successes,
        attempts = merged.attempts,
        "state updated"
    );
    Ok(Json(UpdateAck::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body, body::Body, http::Request};
    use tower::ServiceExt;

    fn test_app() -> Router {
        build_router(Arc::new(AppState {
            store: CounterStore::default(),
        }))
    }

    async fn get_state_json(app: Router) -> serde_json::Value {
        let request = Request::get("/state").body(Body::empty()).expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn post_state_request(payload: &str) -> Request<Body> {
        Request::post("/state")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let request = Request::get("/healthz")
            .body(Body::empty())
            .expect("request");
        let response = test_app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(bytes.as_ref(), b"ok");
    }

    #[tokio::test]
    async fn state_snapshot_carries_the_full_wire_contract() {
        let snapshot = get_state_json(test_app()).await;
        assert_eq!(snapshot["successes"], 0);
        assert_eq!(snapshot["attempts"], 0);
        assert_eq!(snapshot["trackAttempts"], true);
        assert_eq!(snapshot["showButtons"], true);
        assert_eq!(snapshot["label"], "Mounts Dropped:");
        assert_eq!(snapshot["fontFamily"], "Arial");
        assert_eq!(snapshot["fontSize"], 48);
        assert_eq!(snapshot["fontColor"], "#FF0000");
        assert!(snapshot.get("hotkeys").is_none());
    }

    #[tokio::test]
    async fn partial_patch_merges_and_acks() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_state_request(r#"{ "successes": 5 }"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let ack: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(ack, serde_json::json!({ "success": true }));

        let snapshot = get_state_json(app).await;
        assert_eq!(snapshot["successes"], 5);
        assert_eq!(snapshot["label"], "Mounts Dropped:");
        assert_eq!(snapshot["fontColor"], "#FF0000");
    }

    #[tokio::test]
    async fn sequential_patches_accumulate_key_by_key() {
        let app = test_app();
        for payload in [
            r#"{ "label": "Wipes:" }"#,
            r#"{ "successes": 2, "attempts": 6 }"#,
            r#"{ "trackAttempts": false }"#,
        ] {
            let response = app
                .clone()
                .oneshot(post_state_request(payload))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }
        let snapshot = get_state_json(app).await;
        assert_eq!(snapshot["label"], "Wipes:");
        assert_eq!(snapshot["successes"], 2);
        assert_eq!(snapshot["attempts"], 6);
        assert_eq!(snapshot["trackAttempts"], false);
    }

    #[tokio::test]
    async fn unknown_and_mismatched_keys_are_ignored() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_state_request(
                r#"{ "streak": 4, "successes": "plenty", "attempts": 3 }"#,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = get_state_json(app).await;
        assert_eq!(snapshot["successes"], 0);
        assert_eq!(snapshot["attempts"], 3);
        assert!(snapshot.get("streak").is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_without_touching_state() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_state_request("not json at all"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let error: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(error["code"], "validation");

        let snapshot = get_state_json(app).await;
        assert_eq!(snapshot["successes"], 0);
    }

    #[tokio::test]
    async fn control_and_display_pages_are_served() {
        for (uri, marker) in [("/", "id=\"settings\""), ("/display", "id=\"counter\"")] {
            let request = Request::get(uri).body(Body::empty()).expect("request");
            let response = test_app().oneshot(request).await.expect("response");
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body");
            let page = String::from_utf8(bytes.to_vec()).expect("utf8");
            assert!(page.contains(marker), "{uri} missing {marker}");
        }
    }

    #[tokio::test]
    async fn display_page_polls_at_the_contract_cadence() {
        let request = Request::get("/display")
            .body(Body::empty())
            .expect("request");
        let response = test_app().oneshot(request).await.expect("response");
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let page = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert!(page.contains(&shared::protocol::POLL_INTERVAL_MS.to_string()));
    }
}
