use arcade_server_domain::{
    ServiceError, ServiceResult,
    game::{Game, GameRepository, GameSubmission},
    player::PlayerId,
    stats::PlayerStats,
};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::{millis_to_datetime, stats::stats_from_row, storage_error};

// Same arithmetic as PlayerStats::record_score. Every right-hand side sees the
// row as it was before the update.
const UPDATE_STATS_SQL: &str = "UPDATE player_stats SET
        best_score = CASE WHEN total_games = 0 THEN ? ELSE MAX(best_score, ?) END,
        avg_score = avg_score + (CAST(? AS REAL) - avg_score) / (total_games + 1),
        total_games = total_games + 1,
        updated_at = ?
    WHERE player_id = ?";

pub struct SqliteGameRepository {
    pool: Pool<Sqlite>,
}

impl SqliteGameRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn game_from_row(row: &SqliteRow) -> sqlx::Result<Game> {
        Ok(Game {
            id: row.try_get("id")?,
            player_id: row.try_get("player_id")?,
            score: row.try_get("score")?,
            avg_mic_level: row.try_get("avg_mic_level")?,
            max_mic_level: row.try_get("max_mic_level")?,
            duration_seconds: row.try_get("duration_seconds")?,
            created_at: millis_to_datetime(row.try_get("created_at")?)?,
        })
    }
}

#[async_trait::async_trait]
impl GameRepository for SqliteGameRepository {
    async fn record_game(
        &self,
        player_id: PlayerId,
        submission: &GameSubmission,
        now: DateTime<Utc>,
    ) -> ServiceResult<(Game, PlayerStats)> {
        let created_at = now.timestamp_millis();
        let stored_at = millis_to_datetime(created_at).map_err(storage_error)?;
        // Dropping the transaction without commit rolls everything back.
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let game_id = sqlx::query(
            "INSERT INTO games (player_id, score, avg_mic_level, max_mic_level, duration_seconds, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(player_id)
        .bind(submission.score)
        .bind(submission.avg_mic_level)
        .bind(submission.max_mic_level)
        .bind(submission.duration_seconds)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?
        .last_insert_rowid();

        sqlx::query("INSERT OR IGNORE INTO player_stats (player_id, updated_at) VALUES (?, ?)")
            .bind(player_id)
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        let res = sqlx::query(UPDATE_STATS_SQL)
            .bind(submission.score)
            .bind(submission.score)
            .bind(submission.score)
            .bind(created_at)
            .bind(player_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        if res.rows_affected() != 1 {
            return ServiceError::internal(format!(
                "Stats row for player {} was not updated",
                player_id
            ));
        }

        let stats_row = sqlx::query("SELECT * FROM player_stats WHERE player_id = ?")
            .bind(player_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_error)?;
        let stats = stats_from_row(&stats_row).map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        let game = Game {
            id: game_id,
            player_id,
            score: submission.score,
            avg_mic_level: submission.avg_mic_level,
            max_mic_level: submission.max_mic_level,
            duration_seconds: submission.duration_seconds,
            created_at: stored_at,
        };
        Ok((game, stats))
    }

    async fn get_games_by_player(&self, player_id: PlayerId) -> ServiceResult<Vec<Game>> {
        let rows =
            sqlx::query("SELECT * FROM games WHERE player_id = ? ORDER BY created_at DESC, id DESC")
                .bind(player_id)
                .fetch_all(&self.pool)
                .await
                .map_err(storage_error)?;
        rows.iter()
            .map(Self::game_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(storage_error)
    }
}
