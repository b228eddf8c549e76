use std::sync::Arc;

use arcade_server_domain::{ServiceError, app::Application, jwt::AuthError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{debug, error, info};
use thiserror::Error;

use crate::cookie::SessionCookieConfig;

mod auth;
pub mod cookie;
mod http;
pub mod jwt;

pub use http::router;
pub use jwt::JwtServiceImpl;

#[derive(Clone)]
pub struct AppState {
    pub app: Application,
    pub session_cookie: Arc<SessionCookieConfig>,
}

impl AppState {
    /// The session cookie lives exactly as long as the tokens the
    /// application issues.
    pub fn new(app: Application, cookie_secure: bool) -> Self {
        let session_cookie = SessionCookieConfig::new(app.jwt_service.session_ttl(), cookie_secure);
        Self {
            app,
            session_cookie: Arc::new(session_cookie),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

pub async fn serve(
    state: AppState,
    config: &HttpConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let router = router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        "HTTP server listening on {}:{}",
        config.host, config.port
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shut down gracefully");
    Ok(())
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) | ApiError::Service(ServiceError::BadRequest(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Service(ServiceError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Service(ServiceError::Forbidden(msg)) => (StatusCode::FORBIDDEN, msg),
            ApiError::Service(ServiceError::Unauthorized(reason)) => {
                debug!("Rejected request: {}", reason);
                let msg = match reason {
                    AuthError::WrongCredentials => "Incorrect username or password",
                    _ => "Not authenticated",
                };
                (StatusCode::UNAUTHORIZED, msg.to_string())
            }
            ApiError::Service(ServiceError::Internal(msg)) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        let body = serde_json::json!({ "error": msg });
        (status, Json(body)).into_response()
    }
}
