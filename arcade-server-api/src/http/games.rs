use arcade_server_domain::{
    game::{Game, GameId, GameSubmission},
    player::PlayerId,
};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState, auth::Auth};

#[derive(Deserialize)]
pub struct GamePayload {
    pub score: i64,
    #[serde(default)]
    pub avg_mic_level: f64,
    #[serde(default)]
    pub max_mic_level: f64,
    #[serde(default)]
    pub duration_seconds: i64,
}

impl From<GamePayload> for GameSubmission {
    fn from(payload: GamePayload) -> Self {
        Self {
            score: payload.score,
            avg_mic_level: payload.avg_mic_level,
            max_mic_level: payload.max_mic_level,
            duration_seconds: payload.duration_seconds,
        }
    }
}

#[derive(Serialize)]
pub struct JsonGame {
    id: GameId,
    player_id: PlayerId,
    score: i64,
    avg_mic_level: f64,
    max_mic_level: f64,
    duration_seconds: i64,
    created_at: String,
}

impl From<Game> for JsonGame {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            player_id: game.player_id,
            score: game.score,
            avg_mic_level: game.avg_mic_level,
            max_mic_level: game.max_mic_level,
            duration_seconds: game.duration_seconds,
            created_at: game.created_at.to_rfc3339(),
        }
    }
}

pub async fn submit_game(
    Auth(player): Auth,
    State(state): State<AppState>,
    Json(payload): Json<GamePayload>,
) -> Result<Json<JsonGame>, ApiError> {
    let game = state
        .app
        .game_service
        .submit_game(player.id, payload.into())
        .await?;
    Ok(Json(game.into()))
}

pub async fn my_games(
    Auth(player): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonGame>>, ApiError> {
    let games = state.app.game_service.get_games(player.id).await?;
    Ok(Json(games.into_iter().map(JsonGame::from).collect()))
}
