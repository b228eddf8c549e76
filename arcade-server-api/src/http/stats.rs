use arcade_server_domain::{
    player::PlayerId,
    stats::{LeaderboardEntry, PlayerStats},
};
use axum::{Json, extract::State};
use serde::Serialize;

use crate::{ApiError, AppState, auth::Auth};

#[derive(Serialize)]
pub struct JsonStats {
    player_id: PlayerId,
    total_games: i64,
    best_score: i64,
    avg_score: f64,
}

impl From<&PlayerStats> for JsonStats {
    fn from(stats: &PlayerStats) -> Self {
        Self {
            player_id: stats.player_id,
            total_games: stats.total_games,
            best_score: stats.best_score,
            avg_score: stats.avg_score,
        }
    }
}

#[derive(Serialize)]
pub struct JsonLeaderboardEntry {
    #[serde(flatten)]
    stats: JsonStats,
    username: String,
}

impl From<LeaderboardEntry> for JsonLeaderboardEntry {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            stats: JsonStats::from(&entry.stats),
            username: entry.username,
        }
    }
}

pub async fn my_stats(
    Auth(player): Auth,
    State(state): State<AppState>,
) -> Result<Json<JsonStats>, ApiError> {
    let stats = state.app.stats_service.get_stats(player.id).await?;
    Ok(Json(JsonStats::from(&stats)))
}

pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonLeaderboardEntry>>, ApiError> {
    let entries = state.app.stats_service.get_leaderboard().await?;
    Ok(Json(
        entries.into_iter().map(JsonLeaderboardEntry::from).collect(),
    ))
}
