use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;

use crate::{
    ServiceError, ServiceResult,
    player::PlayerId,
    stats::PlayerStats,
};

pub type GameId = i64;

/// A finished session as submitted by the client.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSubmission {
    pub score: i64,
    pub avg_mic_level: f64,
    pub max_mic_level: f64,
    pub duration_seconds: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub id: GameId,
    pub player_id: PlayerId,
    pub score: i64,
    pub avg_mic_level: f64,
    pub max_mic_level: f64,
    pub duration_seconds: i64,
    pub created_at: DateTime<Utc>,
}

pub type ArcGameRepository = Arc<Box<dyn GameRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait GameRepository {
    /// Stores the game and folds its score into the player's stats.
    /// Either both writes happen or neither does.
    async fn record_game(
        &self,
        player_id: PlayerId,
        submission: &GameSubmission,
        now: DateTime<Utc>,
    ) -> ServiceResult<(Game, PlayerStats)>;
    /// Newest first.
    async fn get_games_by_player(&self, player_id: PlayerId) -> ServiceResult<Vec<Game>>;
}

pub type ArcGameService = Arc<Box<dyn GameService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait GameService {
    async fn submit_game(
        &self,
        player_id: PlayerId,
        submission: GameSubmission,
    ) -> ServiceResult<Game>;
    async fn get_games(&self, player_id: PlayerId) -> ServiceResult<Vec<Game>>;
}

pub struct GameServiceImpl {
    game_repository: ArcGameRepository,
}

impl GameServiceImpl {
    pub fn new(game_repository: ArcGameRepository) -> Self {
        Self { game_repository }
    }

    fn validate_submission(submission: &GameSubmission) -> ServiceResult<()> {
        if !submission.avg_mic_level.is_finite() || submission.avg_mic_level < 0.0 {
            return ServiceError::bad_request("avg_mic_level must be a non-negative number");
        }
        if !submission.max_mic_level.is_finite() || submission.max_mic_level < 0.0 {
            return ServiceError::bad_request("max_mic_level must be a non-negative number");
        }
        if submission.duration_seconds < 0 {
            return ServiceError::bad_request("duration_seconds must not be negative");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameService for GameServiceImpl {
    async fn submit_game(
        &self,
        player_id: PlayerId,
        submission: GameSubmission,
    ) -> ServiceResult<Game> {
        Self::validate_submission(&submission)?;
        let (game, stats) = self
            .game_repository
            .record_game(player_id, &submission, Utc::now())
            .await?;
        debug!(
            "Player {} recorded game {} (score {}), now {} games, best {}, avg {:.2}",
            player_id, game.id, game.score, stats.total_games, stats.best_score, stats.avg_score
        );
        Ok(game)
    }

    async fn get_games(&self, player_id: PlayerId) -> ServiceResult<Vec<Game>> {
        self.game_repository.get_games_by_player(player_id).await
    }
}
