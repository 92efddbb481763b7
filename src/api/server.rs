//! Axum server for `POST /chat-ai`.
//!
//! Credentials are looked up per request from the [`CredentialStore`], keyed by
//! the optional `x-user-id` header.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{info, warn};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::api::types::{ChatRequest, ChatResponse, ErrorResponse};
use crate::core::config::ResolvedConfig;
use crate::core::{CredentialStore, EnvCredentialStore, Orchestrator};
use crate::inference::Mode;

pub const USER_ID_HEADER: &str = "x-user-id";
const DEFAULT_USER_ID: &str = "default";

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub credentials: Arc<dyn CredentialStore>,
    /// Mode used when a request omits `model`.
    pub default_mode: Mode,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static(USER_ID_HEADER),
        ]);

    Router::new()
        .route("/chat-ai", post(chat))
        .with_state(Arc::new(state))
        .layer(cors)
}

/// Binds `config.bind` and serves until the process is stopped.
pub async fn serve(config: &ResolvedConfig) -> std::io::Result<()> {
    let state = AppState {
        orchestrator: Orchestrator::from_config(config),
        credentials: Arc::new(EnvCredentialStore::new(config.file_credentials.clone())),
        default_mode: config.mode,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("[{request_id}] Rejected request body: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_USER_ID);
    let mode = request.model.unwrap_or(state.default_mode);
    info!(
        "[{request_id}] chat request: user={user_id}, mode={mode:?}, content_len={}",
        request.content.len()
    );

    let credentials = state.credentials.credentials(user_id);
    match state
        .orchestrator
        .compose(&request.content, mode, &credentials)
        .await
    {
        Ok(response) => {
            info!("[{request_id}] replied with {} bytes", response.len());
            (StatusCode::OK, Json(ChatResponse { response })).into_response()
        }
        Err(err) => {
            warn!("[{request_id}] chat failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
