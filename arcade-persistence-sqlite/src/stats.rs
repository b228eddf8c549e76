use arcade_server_domain::{
    ServiceResult,
    player::PlayerId,
    stats::{LeaderboardEntry, PlayerStats, StatsRepository},
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::{millis_to_datetime, storage_error};

pub struct SqliteStatsRepository {
    pool: Pool<Sqlite>,
}

impl SqliteStatsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

pub(crate) fn stats_from_row(row: &SqliteRow) -> sqlx::Result<PlayerStats> {
    Ok(PlayerStats {
        player_id: row.try_get("player_id")?,
        total_games: row.try_get("total_games")?,
        best_score: row.try_get("best_score")?,
        avg_score: row.try_get("avg_score")?,
        updated_at: millis_to_datetime(row.try_get("updated_at")?)?,
    })
}

#[async_trait::async_trait]
impl StatsRepository for SqliteStatsRepository {
    async fn get_player_stats(&self, player_id: PlayerId) -> ServiceResult<Option<PlayerStats>> {
        let row = sqlx::query("SELECT * FROM player_stats WHERE player_id = ?")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;
        row.as_ref()
            .map(stats_from_row)
            .transpose()
            .map_err(storage_error)
    }

    async fn get_leaderboard(&self, limit: usize) -> ServiceResult<Vec<LeaderboardEntry>> {
        let rows = sqlx::query(
            "SELECT s.player_id AS player_id, s.total_games AS total_games,
                    s.best_score AS best_score, s.avg_score AS avg_score,
                    s.updated_at AS updated_at, p.username AS username
             FROM player_stats s JOIN players p ON p.id = s.player_id
             ORDER BY s.best_score DESC, s.player_id ASC
             LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter()
            .map(|row| {
                Ok(LeaderboardEntry {
                    username: row.try_get("username")?,
                    stats: stats_from_row(row)?,
                })
            })
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use arcade_server_domain::{
        game::{GameRepository, GameSubmission},
        player::PlayerRepository,
    };
    use chrono::Utc;

    use crate::{create_memory_pool, games::SqliteGameRepository, players::SqlitePlayerRepository};

    use super::*;

    async fn play(games: &SqliteGameRepository, player_id: PlayerId, score: i64) {
        let submission = GameSubmission {
            score,
            avg_mic_level: 0.0,
            max_mic_level: 0.0,
            duration_seconds: 0,
        };
        games
            .record_game(player_id, &submission, Utc::now())
            .await
            .expect("Failed to record game");
    }

    #[tokio::test]
    async fn test_leaderboard_order_and_limit() {
        let pool = create_memory_pool().await.unwrap();
        let players = SqlitePlayerRepository::new(pool.clone());
        let games = SqliteGameRepository::new(pool.clone());
        let stats = SqliteStatsRepository::new(pool);

        let mut ids = Vec::new();
        for i in 0..12 {
            let player = players
                .create_player(&format!("player{}", i), "hash", Utc::now())
                .await
                .unwrap();
            play(&games, player.id, (i % 3) * 100).await;
            ids.push(player.id);
        }

        let board = stats.get_leaderboard(10).await.unwrap();
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].stats.best_score, 200);
        assert_eq!(board[0].username, "player2");
        for pair in board.windows(2) {
            let (a, b) = (&pair[0].stats, &pair[1].stats);
            assert!(a.best_score >= b.best_score);
            if a.best_score == b.best_score {
                assert!(a.player_id < b.player_id);
            }
        }

        let again = stats.get_leaderboard(10).await.unwrap();
        assert_eq!(board, again);

        assert_eq!(stats.get_leaderboard(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_leaderboard_includes_players_without_games() {
        let pool = create_memory_pool().await.unwrap();
        let players = SqlitePlayerRepository::new(pool.clone());
        let stats = SqliteStatsRepository::new(pool);

        let alice = players.create_player("alice", "hash", Utc::now()).await.unwrap();
        let board = stats.get_leaderboard(10).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].stats.player_id, alice.id);
        assert_eq!(board[0].stats.total_games, 0);
    }
}
