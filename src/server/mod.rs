//! HTTP surface of the relay: `POST /api/chat` and `GET /health`.

pub mod handlers;

use std::error::Error;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::config::Config;
use crate::core::models::ProviderKind;
use crate::core::router::ChatRouter;

/// Shared, read-only request state.
pub struct AppState {
    pub router: ChatRouter,
}

impl AppState {
    pub fn new(router: ChatRouter) -> Self {
        Self { router }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Startup warnings for settings an operator should know about.
fn log_startup_checks(config: &Config) {
    if config.safety.threshold.is_permissive() {
        warn!(
            threshold = config.safety.threshold.as_config_str(),
            "Gemini safety filters are disabled for every harm category"
        );
    }
    for provider in [ProviderKind::Gemini, ProviderKind::OpenRouter] {
        if config.provider_api_key(provider).is_none() {
            warn!(
                provider = %provider,
                "{} is not set; requests routed to {} will fail",
                provider.credential_env_var(),
                provider.display_name()
            );
        }
    }
}

pub async fn run_server(config: Config) -> Result<(), Box<dyn Error>> {
    log_startup_checks(&config);
    let router = ChatRouter::from_config(&config)?;
    let state = Arc::new(AppState::new(router));
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("╔══════════════════════════════════════════════════════════════╗");
    info!("║  Nero chat relay {:44}║", crate::version_string());
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Listening on:  {:45}║", addr);
    info!("║  Default model: {:45}║", config.default_model());
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Endpoints:                                                  ║");
    info!("║    GET  /health    - Liveness and default model              ║");
    info!("║    POST /api/chat  - Relay a conversation turn               ║");
    info!("╚══════════════════════════════════════════════════════════════╝");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Failed to install Ctrl-C handler; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatReplyBody, ErrorBody, HealthResponse, ReplyStatus};
    use crate::core::error::{RelayError, EMPTY_TRANSCRIPT_MESSAGE, LAST_MESSAGE_MESSAGE};
    use crate::core::reply::{ChatReply, DegradedReason, TRUNCATION_NOTICE};
    use crate::core::router::test_support::{router_with, FakeAdapter};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    fn app(gemini: Arc<FakeAdapter>, openrouter: Arc<FakeAdapter>) -> Router {
        build_router(Arc::new(AppState::new(router_with(gemini, openrouter))))
    }

    fn default_app() -> Router {
        app(
            FakeAdapter::answering(ProviderKind::Gemini, "gemini says hi"),
            FakeAdapter::answering(ProviderKind::OpenRouter, "openrouter says hi"),
        )
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_reports_default_model_and_version() {
        let response = default_app()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = read_json(response).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.model, "gemini-2.5-flash");
        assert!(health.version.is_some());
    }

    #[tokio::test]
    async fn chat_returns_ok_envelope() {
        let response = default_app()
            .oneshot(chat_request(
                r#"{"messages":[{"role":"assistant","content":"welcome"},{"role":"user","content":"hi"}],"behaviour":"brief","model":"qwen/qwen3-4b:free"}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body: ChatReplyBody = read_json(response).await;
        assert_eq!(body.reply, "openrouter says hi");
        assert_eq!(body.model, "qwen/qwen3-4b:free");
        assert_eq!(body.status, ReplyStatus::Ok);
        assert!(body.reason.is_none());
    }

    #[tokio::test]
    async fn truncated_reply_is_still_http_200() {
        let gemini = FakeAdapter::new(
            ProviderKind::Gemini,
            Ok(ChatReply::truncated("partial answer", "fake")),
        );
        let openrouter = FakeAdapter::answering(ProviderKind::OpenRouter, "unused");
        let response = app(gemini, openrouter)
            .oneshot(chat_request(r#"{"messages":[{"role":"user","content":"long essay"}]}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body: ChatReplyBody = read_json(response).await;
        assert_eq!(body.reply, format!("partial answer{TRUNCATION_NOTICE}"));
        assert_eq!(body.status, ReplyStatus::Degraded);
        assert_eq!(body.reason.as_deref(), Some(DegradedReason::Truncated.as_str()));
    }

    #[tokio::test]
    async fn assistant_last_message_is_400() {
        let gemini = FakeAdapter::answering(ProviderKind::Gemini, "unused");
        let response = app(gemini.clone(), FakeAdapter::answering(ProviderKind::OpenRouter, "unused"))
            .oneshot(chat_request(
                r#"{"messages":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, LAST_MESSAGE_MESSAGE);
        assert!(body.model.is_none());
        assert_eq!(gemini.hits(), 0);
    }

    #[tokio::test]
    async fn missing_or_empty_messages_is_400() {
        for raw in [r#"{}"#, r#"{"messages":[]}"#, r#"{"messages":{"role":"user"}}"#] {
            let response = default_app()
                .oneshot(chat_request(raw))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{raw}");
            let body: ErrorBody = read_json(response).await;
            assert_eq!(body.error, EMPTY_TRANSCRIPT_MESSAGE);
        }
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let response = default_app()
            .oneshot(chat_request(r#"{"messages": [ "#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, handlers::INVALID_JSON_MESSAGE);
    }

    #[tokio::test]
    async fn missing_credential_is_500_with_model() {
        let gemini = FakeAdapter::new(
            ProviderKind::Gemini,
            Err(RelayError::missing_credential(ProviderKind::Gemini)),
        );
        let response = app(gemini, FakeAdapter::answering(ProviderKind::OpenRouter, "unused"))
            .oneshot(chat_request(
                r#"{"messages":[{"role":"user","content":"hi"}],"model":"gemini-2.5-pro"}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "Missing GOOGLE_API_KEY");
        assert_eq!(body.model.as_deref(), Some("gemini-2.5-pro"));
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn upstream_failure_is_500_with_details() {
        let openrouter = FakeAdapter::new(
            ProviderKind::OpenRouter,
            Err(RelayError::upstream(
                ProviderKind::OpenRouter,
                Some(502),
                "upstream unavailable",
            )),
        );
        let response = app(FakeAdapter::answering(ProviderKind::Gemini, "unused"), openrouter)
            .oneshot(chat_request(
                r#"{"messages":[{"role":"user","content":"hi"}],"model":"qwen/qwen3-4b:free"}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "Failed to fetch response from OpenRouter");
        assert_eq!(body.details.as_deref(), Some("502: upstream unavailable"));
        assert_eq!(body.model.as_deref(), Some("qwen/qwen3-4b:free"));
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let response = default_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/chat")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }
}
