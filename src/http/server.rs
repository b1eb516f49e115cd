//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router forwarding every path to the mount table
//! - Wire up middleware (tracing, metrics, timeout, body limit, request ID)
//! - Decompose requests into segments and parameters
//! - Run dispatch on the blocking pool
//! - Serve until the shutdown signal

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Path, RawQuery, State},
    http::{HeaderMap, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::{extract_params, request_id, MakeRequestUuid};
use crate::http::response::json_error;
use crate::observability::metrics;
use crate::resource::{split_path, Root};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: Arc<Root>,
}

/// HTTP front end for a resource tree.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server serving `root`.
    pub fn new(config: ServiceConfig, root: Root) -> Self {
        let state = AppState {
            root: Arc::new(root),
        };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch_root))
            .route("/{*path}", any(dispatch_nested))
            .with_state(state.clone())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(state, record_metrics))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Count every response, including those produced by the limit and
/// timeout layers or by extractor rejections.
async fn record_metrics(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let mount = split_path(request.uri().path())
        .into_iter()
        .next()
        .filter(|m| state.root.has_mount(m))
        .unwrap_or_else(|| "none".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), &mount, start_time);
    response
}

async fn dispatch_root(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    dispatch_path(state, method, String::new(), headers, query, body).await
}

async fn dispatch_nested(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    dispatch_path(state, method, path, headers, query, body).await
}

/// Decompose the request and hand it to the mount table.
async fn dispatch_path(
    state: AppState,
    method: Method,
    path: String,
    headers: HeaderMap,
    query: Option<String>,
    body: Bytes,
) -> Response {
    let request_id = request_id(&headers).to_string();
    let segments = split_path(&path);

    let params = match extract_params(query.as_deref(), &headers, &body) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Malformed request body");
            return json_error(StatusCode::BAD_REQUEST, "malformed_body", e.to_string());
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        params = params.len(),
        "Dispatching request"
    );

    let root = Arc::clone(&state.root);
    let span = tracing::Span::current();
    let outcome = tokio::task::spawn_blocking(move || {
        span.in_scope(|| root.dispatch_segments(&method, &segments, &params))
    })
    .await;

    match outcome {
        Ok(Ok(reply)) => reply.into_response(),
        Ok(Err(e)) => {
            tracing::debug!(request_id = %request_id, status = %e.status(), error = %e, "Dispatch failed");
            e.into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task aborted");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Ancestry, Collection, Dispatcher, HandlerError, Reply};
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
    use metrics_util::MetricKind;
    use std::collections::HashMap;
    use tower::ServiceExt;

    struct Pings;

    impl Collection for Pings {
        type Resource = String;

        fn instantiate(&self, id: &str, _: Option<&Ancestry<'_>>) -> Result<Option<String>, HandlerError> {
            Ok((id != "missing").then(|| id.to_string()))
        }
    }

    fn server() -> HttpServer {
        server_with(ServiceConfig::default())
    }

    fn server_with(config: ServiceConfig) -> HttpServer {
        let pings = Dispatcher::builder("pings", Pings)
            .expose("index", |c| Ok(Reply::text(format!("pong {}", c.resource))))
            .expose("add", |c| Reply::json(serde_json::json!({ "n": c.params.str("n") })))
            .build()
            .unwrap();
        let root = Root::default().mount("pings", pings).unwrap();
        HttpServer::new(config, root)
    }

    async fn send(request: Request<Body>) -> Response {
        server().router().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_resource() {
        let response = send(Request::get("/pings/a").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"pong a");
    }

    #[tokio::test]
    async fn test_missing_resource_404() {
        let response = send(Request::get("/pings/missing").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_json_body_reaches_handler() {
        let request = Request::post("/pings/a?n=1")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"n":"2"}"#))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["n"], "2");
    }

    #[tokio::test]
    async fn test_malformed_body_400() {
        let request = Request::post("/pings/a")
            .header("content-type", "application/json")
            .body(Body::from("{nope"))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let request = Request::get("/pings/a")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    /// `dispatch_requests_total` by (method, status, mount).
    fn request_counts(snapshotter: &Snapshotter) -> HashMap<(String, String, String), u64> {
        let mut counts = HashMap::new();
        for (key, _, _, value) in snapshotter.snapshot().into_vec() {
            if key.kind() != MetricKind::Counter || key.key().name() != "dispatch_requests_total" {
                continue;
            }
            let label = |name: &str| {
                key.key()
                    .labels()
                    .find(|l| l.key() == name)
                    .map(|l| l.value().to_string())
                    .unwrap_or_default()
            };
            if let DebugValue::Counter(n) = value {
                counts.insert((label("method"), label("status"), label("mount")), n);
            }
        }
        counts
    }

    #[test]
    fn test_rejected_requests_are_counted() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let mut config = ServiceConfig::default();
        config.limits.max_body_bytes = 16;
        let router = server_with(config).router();

        ::metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let ok = router
                    .clone()
                    .oneshot(Request::get("/pings/a").body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                assert_eq!(ok.status(), StatusCode::OK);

                let body = vec![b'x'; 64];
                let too_large = Request::post("/pings/a")
                    .header("content-type", "application/json")
                    .header("content-length", body.len())
                    .body(Body::from(body))
                    .unwrap();
                let response = router.clone().oneshot(too_large).await.unwrap();
                assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

                let brew = Request::builder()
                    .method(Method::from_bytes(b"BREW").unwrap())
                    .uri("/nowhere")
                    .body(Body::empty())
                    .unwrap();
                let response = router.clone().oneshot(brew).await.unwrap();
                assert_eq!(response.status(), StatusCode::NOT_FOUND);
            })
        });

        let counts = request_counts(&snapshotter);
        let key = |m: &str, s: &str, mount: &str| (m.to_string(), s.to_string(), mount.to_string());
        assert_eq!(counts.get(&key("GET", "200", "pings")), Some(&1));
        assert_eq!(counts.get(&key("POST", "413", "pings")), Some(&1));
        assert_eq!(counts.get(&key("other", "404", "none")), Some(&1));
        assert_eq!(counts.len(), 3);
    }
}
