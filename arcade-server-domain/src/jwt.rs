use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{ServiceResult, player::PlayerUsername};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no session token")]
    Missing,
    #[error("session token is malformed")]
    Malformed,
    #[error("session token has expired")]
    Expired,
    #[error("session token has no subject")]
    NoSubject,
    #[error("session token refers to an unknown player")]
    UnknownUser,
    #[error("wrong credentials")]
    WrongCredentials,
}

pub type ArcJwtService = Arc<Box<dyn JwtService + Send + Sync>>;

pub trait JwtService {
    /// Lifetime of issued tokens. The session cookie uses the same value.
    fn session_ttl(&self) -> Duration;

    fn issue(&self, username: &PlayerUsername, now: DateTime<Utc>) -> ServiceResult<String>;

    fn validate(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PlayerUsername, AuthError>;
}
