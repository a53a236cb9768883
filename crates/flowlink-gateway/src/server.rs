//! Gateway server — snapshot load, index build, and HTTP routes

use crate::auth::{self, ResolvedAuth};
use crate::query::QueryService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use flowlink_core::{
    AuthMode, CollectionKind, Error, FlowlinkConfig, GraphResponse, LoginRequest, QueryRequest,
};
use flowlink_graph::{LookupIndex, Snapshot};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared state for all handlers.
pub struct GatewayState {
    pub auth: ResolvedAuth,
    pub queries: QueryService,
    /// When the gateway started.
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(auth: ResolvedAuth, index: Arc<LookupIndex>) -> Self {
        Self {
            auth,
            queries: QueryService::new(index),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/query", post(query_handler))
        .route("/login", post(login_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_gateway(config: FlowlinkConfig) -> anyhow::Result<()> {
    let snapshot = Snapshot::load(&config.data.dir)?;
    let index = Arc::new(LookupIndex::build(&snapshot)?);
    let auth = ResolvedAuth::from_config(&config.auth);
    let state = Arc::new(GatewayState::new(auth, index));
    let app = router(state);

    let bind_addr: SocketAddr = format!("{}:{}", config.gateway.bind.to_addr(), config.gateway.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address: {}", e))?;

    info!("Flowlink Gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Query:  POST http://{}/query", bind_addr);
    info!("  Login:  POST http://{}/login", bind_addr);
    info!("  Data:   {}", config.data.dir.display());
    info!("  Auth mode: {:?}", config.auth.mode);
    if config.auth.mode == AuthMode::None {
        warn!("Authentication is disabled; every caller is admitted");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Maps core errors onto HTTP status and the GraphQL-style error envelope.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::InvalidShape(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if !self.0.is_client_error() {
            error!("request failed: {}", self.0);
        }
        (status, Json(GraphResponse::err(self.0.to_string()))).into_response()
    }
}

fn request_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(request)| request)
        .map_err(|rejection| ApiError(Error::InvalidRequest(rejection.body_text())))
}

async fn query_handler(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<GraphResponse>, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let identity = state.auth.identity_from_header(authorization);
    // Unauthenticated callers never see body parse errors.
    auth::check(identity.as_ref())?;
    let request = request_body(body)?;
    let node = state.queries.node(identity.as_ref(), &request)?;
    Ok(Json(GraphResponse::ok("node", node.unwrap_or(Value::Null))))
}

async fn login_handler(
    State(state): State<Arc<GatewayState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<GraphResponse>, ApiError> {
    let request = request_body(body)?;
    match state.auth.login(&request.username, &request.password) {
        Ok(token) => {
            info!("login: issued token for {}", request.username);
            Ok(Json(GraphResponse::ok("login", Value::String(token))))
        }
        Err(e) => {
            warn!("login: rejected credentials for {}", request.username);
            Err(e.into())
        }
    }
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let index = state.queries.index();
    let collections: serde_json::Map<String, Value> = CollectionKind::ALL
        .iter()
        .map(|kind| (kind.to_string(), Value::from(index.len(*kind))))
        .collect();
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "collections": collections,
        "lookups": index.lookup_count(),
    }))
}
