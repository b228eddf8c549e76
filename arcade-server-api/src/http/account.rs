use arcade_server_domain::player::{Player, PlayerId};
use axum::{
    Form, Json,
    extract::{Path, State},
    http::header::SET_COOKIE,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{ApiError, AppState, auth::Auth};

#[derive(Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct JsonPlayer {
    id: PlayerId,
    username: String,
    created_at: String,
}

impl From<&Player> for JsonPlayer {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            username: player.username.clone(),
            created_at: player.created_at.to_rfc3339(),
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<JsonPlayer>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let player = state
        .app
        .player_service
        .register(&payload.username, &payload.password)
        .await?;
    Ok(Json(JsonPlayer::from(&player)))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .app
        .player_service
        .try_login(&form.username, &form.password)
        .await?;
    let cookie = state.session_cookie.build_set_cookie(&token);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({ "message": "Login successful" })),
    ))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = state.session_cookie.build_clear_cookie();
    ([(SET_COOKIE, cookie)], Json(json!({ "message": "Logged out" })))
}

pub async fn me(Auth(player): Auth) -> Json<JsonPlayer> {
    Json(JsonPlayer::from(&player))
}

pub async fn get_player(
    Path(id): Path<PlayerId>,
    State(state): State<AppState>,
) -> Result<Json<JsonPlayer>, ApiError> {
    let player = state.app.player_service.get_player(id).await?;
    Ok(Json(JsonPlayer::from(&player)))
}

pub async fn delete_player(
    Auth(player): Auth,
    Path(id): Path<PlayerId>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.app.player_service.remove_account(&player, id).await?;
    Ok(Json(json!({ "detail": "Player deleted" })))
}
