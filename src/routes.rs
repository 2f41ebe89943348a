use crate::{
    handlers, // Import handlers module
    middleware, // Middleware chain
    AppState, // Use the AppState defined in main.rs
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
///
/// Middleware, outermost first: security headers, request ID, access
/// logging, body size cap, CORS (allow-list), origin enforcement; rate
/// limiting applies to the /api subtree only.
pub fn create_router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/trophies",
            get(handlers::list_trophies).post(handlers::create_trophy),
        )
        .route("/trophies/{id}", delete(handlers::delete_trophy))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    Router::new()
        .nest("/api", api_routes)
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::route_not_found)
        // Middleware Layers (the last layer added runs first)
        .layer(from_fn_with_state(state.clone(), middleware::enforce_origin))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::log_requests))
        .layer(from_fn(middleware::request_id))
        .layer(from_fn(middleware::security_headers))
        .with_state(state) // Pass the application state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::TrophyRepository;
    use crate::errors::RepoError;
    use crate::models::{NewTrophy, Trophy};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::RwLock;
    use tower::ServiceExt; // for `oneshot`
    use uuid::Uuid;

    /// RwLock-backed stand-in for the DynamoDB repository.
    struct InMemoryTrophyRepository {
        records: RwLock<Vec<Trophy>>,
    }

    impl InMemoryTrophyRepository {
        fn new() -> Self {
            Self {
                records: RwLock::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TrophyRepository for InMemoryTrophyRepository {
        async fn create(&self, new: NewTrophy) -> Result<Trophy, RepoError> {
            let trophy = Trophy {
                id: Uuid::new_v4(),
                name: new.name,
                description: new.description,
                image_url: new.image_url,
                created_at: Utc::now(),
            };
            self.records.write().unwrap().push(trophy.clone());
            Ok(trophy)
        }

        async fn list_all(&self) -> Result<Vec<Trophy>, RepoError> {
            let mut trophies = self.records.read().unwrap().clone();
            trophies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(trophies)
        }

        async fn delete_by_id(&self, id: Uuid) -> Result<Trophy, RepoError> {
            let mut records = self.records.write().unwrap();
            match records.iter().position(|t| t.id == id) {
                Some(index) => Ok(records.remove(index)),
                None => Err(RepoError::NotFound(id)),
            }
        }
    }

    fn test_config() -> Config {
        Config {
            bind_address: "127.0.0.1:3000".parse().unwrap(),
            trophies_table_name: "trophies-test".into(),
            aws_region: "us-east-1".into(),
            endpoint_url: None,
            allowed_origins: vec!["http://localhost:5173".into()],
            rate_limit_max_requests: 100,
            rate_limit_window_secs: 900,
            max_body_size_mb: 10,
        }
    }

    fn test_app(config: Config) -> Router {
        let state = Arc::new(AppState::new(
            config,
            Arc::new(InMemoryTrophyRepository::new()),
        ));
        create_router(state)
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_trophy(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/trophies")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = test_app(test_config());
        let response = app.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let app = test_app(test_config());

        let response = app
            .clone()
            .oneshot(post_trophy(json!({
                "name": "Gold Cup",
                "description": "First place",
                "imageUrl": "aGVsbG8="
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["name"], "Gold Cup");
        assert_eq!(created["description"], "First place");
        assert_eq!(created["imageUrl"], "aGVsbG8=");
        assert!(created["id"].as_str().is_some());
        assert!(created["createdAt"].as_str().is_some());

        let response = app.oneshot(get("/api/trophies")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0], created);
    }

    #[tokio::test]
    async fn list_on_empty_store_returns_empty_array() {
        let app = test_app(test_config());
        let response = app.oneshot(get("/api/trophies")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let app = test_app(test_config());

        for name in ["A", "B", "C"] {
            let response = app
                .clone()
                .oneshot(post_trophy(json!({ "name": name, "imageUrl": "aGVsbG8=" })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            // Keep creation timestamps strictly ordered
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let response = app.oneshot(get("/api/trophies")).await.unwrap();
        let listed = body_json(response).await;
        let names: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn create_without_required_fields_is_rejected() {
        let app = test_app(test_config());

        let cases = [
            json!({ "imageUrl": "aGVsbG8=" }),
            json!({ "name": "", "imageUrl": "aGVsbG8=" }),
            json!({ "name": "   ", "imageUrl": "aGVsbG8=" }),
            json!({ "name": "Gold Cup" }),
            json!({ "name": "Gold Cup", "imageUrl": "" }),
            json!({ "name": "Gold Cup", "imageUrl": "   " }),
        ];

        for body in cases {
            let response = app.clone().oneshot(post_trophy(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                body_json(response).await,
                json!({ "message": "Name and imageUrl are required" })
            );
        }
    }

    #[tokio::test]
    async fn delete_succeeds_once_then_not_found() {
        let app = test_app(test_config());

        let response = app
            .clone()
            .oneshot(post_trophy(json!({ "name": "Gold Cup", "imageUrl": "aGVsbG8=" })))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let delete_request = || {
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/trophies/{}", id))
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(delete_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Deleted Trophy" })
        );

        let response = app.oneshot(delete_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Trophy not found" })
        );
    }

    #[tokio::test]
    async fn delete_with_malformed_id_is_rejected() {
        let app = test_app(test_config());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/trophies/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unmatched_route_returns_json_404() {
        let app = test_app(test_config());

        let response = app.clone().oneshot(get("/no-such-route")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Route not found" })
        );

        // Wrong method on a known path falls through to the same handler
        let response = app
            .oneshot(get("/api/trophies/nonexistent-route"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Route not found" })
        );
    }

    #[tokio::test]
    async fn origin_allow_list_is_enforced() {
        let app = test_app(test_config());

        // No Origin header: allowed
        let response = app.clone().oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Allow-listed origin: allowed
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Anything else: rejected before the route runs
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Not allowed by CORS" })
        );
    }

    #[tokio::test]
    async fn rate_limit_rejects_requests_over_the_window_cap() {
        let mut config = test_config();
        config.rate_limit_max_requests = 3;
        let app = test_app(config);

        let request = |client: &str| {
            Request::builder()
                .uri("/api/health")
                .header("x-forwarded-for", client)
                .body(Body::empty())
                .unwrap()
        };

        for _ in 0..3 {
            let response = app.clone().oneshot(request("10.0.0.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.clone().oneshot(request("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Too many requests, please try again later." })
        );

        // A different client is unaffected
        let response = app.oneshot(request("10.0.0.2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn responses_carry_security_headers_and_request_id() {
        let app = test_app(test_config());
        let response = app.oneshot(get("/api/health")).await.unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "SAMEORIGIN");
        assert!(headers.get("x-request-id").is_some());
    }
}
