use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    ServiceError, ServiceResult,
    player::{PlayerId, PlayerUsername},
};

pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub total_games: i64,
    pub best_score: i64,
    pub avg_score: f64,
    pub updated_at: DateTime<Utc>,
}

impl PlayerStats {
    pub fn empty(player_id: PlayerId, now: DateTime<Utc>) -> Self {
        Self {
            player_id,
            total_games: 0,
            best_score: 0,
            avg_score: 0.0,
            updated_at: now,
        }
    }

    /// Folds one new game score into the aggregate using a running mean.
    /// The sqlite repository evaluates the same arithmetic in a single UPDATE.
    pub fn record_score(&mut self, score: i64, now: DateTime<Utc>) {
        self.best_score = if self.total_games == 0 {
            score
        } else {
            self.best_score.max(score)
        };
        self.total_games += 1;
        self.avg_score += (score as f64 - self.avg_score) / self.total_games as f64;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub username: PlayerUsername,
    pub stats: PlayerStats,
}

pub type ArcStatsRepository = Arc<Box<dyn StatsRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait StatsRepository {
    async fn get_player_stats(&self, player_id: PlayerId) -> ServiceResult<Option<PlayerStats>>;
    /// Ordered by best score descending, ties broken by ascending player id.
    async fn get_leaderboard(&self, limit: usize) -> ServiceResult<Vec<LeaderboardEntry>>;
}

pub type ArcStatsService = Arc<Box<dyn StatsService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait StatsService {
    async fn get_stats(&self, player_id: PlayerId) -> ServiceResult<PlayerStats>;
    async fn get_leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>>;
}

pub struct StatsServiceImpl {
    stats_repository: ArcStatsRepository,
}

impl StatsServiceImpl {
    pub fn new(stats_repository: ArcStatsRepository) -> Self {
        Self { stats_repository }
    }
}

#[async_trait::async_trait]
impl StatsService for StatsServiceImpl {
    async fn get_stats(&self, player_id: PlayerId) -> ServiceResult<PlayerStats> {
        match self.stats_repository.get_player_stats(player_id).await? {
            Some(stats) => Ok(stats),
            None => ServiceError::not_found("Stats not found"),
        }
    }

    async fn get_leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        let mut entries = self.stats_repository.get_leaderboard(LEADERBOARD_SIZE).await?;
        entries.truncate(LEADERBOARD_SIZE);
        Ok(entries)
    }
}
