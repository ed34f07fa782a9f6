use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{episodes, handlers, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Episode ledger and pass status
        .route("/episodes", get(episodes::list_episodes))
        .route("/status", get(episodes::get_status))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airtime_core::{
        load_config_from_str, testing::fixtures, EpisodeStore, JsonEpisodeStore, PassReport,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir) -> Arc<AppState> {
        let config = load_config_from_str(
            r#"
[sonarr]
api_key = "sonarr-key"

[real_debrid]
api_key = "rd-key"
"#,
        )
        .unwrap();
        let store = Arc::new(JsonEpisodeStore::new(dir.path().join("data.json")));
        Arc::new(AppState::new(config, store))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_episodes_lists_store_contents() {
        let dir = TempDir::new().unwrap();
        let store = JsonEpisodeStore::new(dir.path().join("data.json"));
        store.upsert(fixtures::tracked_episode(1)).unwrap();
        store.upsert(fixtures::tracked_episode(2)).unwrap();
        store.mark_downloaded(2).unwrap();

        let router = create_router(test_state(&dir));

        let (status, body) = get(router.clone(), "/api/v1/episodes").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["downloaded"], 1);
        assert_eq!(json["episodes"].as_array().unwrap().len(), 2);

        let (_, body) = get(router, "/api/v1/episodes?pending=true").await;
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["episodes"].as_array().unwrap().len(), 1);
        assert_eq!(json["episodes"][0]["episode_id"], 1);
    }

    #[tokio::test]
    async fn test_status_reports_last_pass() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let router = create_router(Arc::clone(&state));

        let (_, body) = get(router.clone(), "/api/v1/status").await;
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["last_pass"].is_null());

        state
            .set_last_report(PassReport {
                downloaded: 3,
                refresh_signaled: true,
                ..PassReport::default()
            })
            .await;

        let (_, body) = get(router, "/api/v1/status").await;
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["last_pass"]["downloaded"], 3);
        assert_eq!(json["last_pass"]["refresh_signaled"], true);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let dir = TempDir::new().unwrap();
        let router = create_router(test_state(&dir));

        let (status, body) = get(router, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("# TYPE"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dir = TempDir::new().unwrap();
        let router = create_router(test_state(&dir));

        let (status, _) = get(router, "/api/v1/downloads").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
