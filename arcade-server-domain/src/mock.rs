use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::{
    ServiceError, ServiceResult,
    game::{Game, GameRepository, GameSubmission},
    jwt::{AuthError, JwtService},
    player::{Player, PlayerId, PlayerRepository, PlayerUsername},
    stats::{LeaderboardEntry, PlayerStats, StatsRepository},
};

#[derive(Default)]
struct MockStoreInner {
    players: Vec<Player>,
    games: Vec<Game>,
    stats: Vec<PlayerStats>,
    next_id: i64,
    fail_stats_updates: bool,
}

impl MockStoreInner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory stand-in for all three repositories, sharing one lock so that
/// every operation is trivially atomic.
#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<MockStoreInner>>,
}

#[allow(unused)]
impl MockStore {
    pub fn insert_player(&self, username: &str) -> PlayerId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let now = Utc::now();
        inner.players.push(Player {
            id,
            username: username.to_string(),
            password_hash: String::new(),
            created_at: now,
        });
        inner.stats.push(PlayerStats::empty(id, now));
        id
    }

    pub fn set_best_score(&self, player_id: PlayerId, best_score: i64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(stats) = inner.stats.iter_mut().find(|s| s.player_id == player_id) {
            stats.best_score = best_score;
        }
    }

    pub fn stats_of(&self, player_id: PlayerId) -> Option<PlayerStats> {
        let inner = self.inner.lock().unwrap();
        inner
            .stats
            .iter()
            .find(|s| s.player_id == player_id)
            .cloned()
    }

    pub fn fail_stats_updates(&self, fail: bool) {
        self.inner.lock().unwrap().fail_stats_updates = fail;
    }
}

#[async_trait::async_trait]
impl PlayerRepository for MockStore {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.players.iter().find(|p| p.id == id).cloned())
    }

    async fn get_player_by_name(&self, name: &str) -> ServiceResult<Option<Player>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.players.iter().find(|p| p.username == name).cloned())
    }

    async fn create_player(
        &self,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Player> {
        let mut inner = self.inner.lock().unwrap();
        if inner.players.iter().any(|p| p.username == username) {
            return ServiceError::bad_request("Username already exists");
        }
        let player = Player {
            id: inner.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        };
        inner.players.push(player.clone());
        inner.stats.push(PlayerStats::empty(player.id, now));
        Ok(player)
    }

    async fn delete_player(&self, id: PlayerId) -> ServiceResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.players.len();
        inner.players.retain(|p| p.id != id);
        inner.games.retain(|g| g.player_id != id);
        inner.stats.retain(|s| s.player_id != id);
        Ok(inner.players.len() != before)
    }
}

#[async_trait::async_trait]
impl GameRepository for MockStore {
    async fn record_game(
        &self,
        player_id: PlayerId,
        submission: &GameSubmission,
        now: DateTime<Utc>,
    ) -> ServiceResult<(Game, PlayerStats)> {
        let mut inner = self.inner.lock().unwrap();
        let game = Game {
            id: inner.next_id(),
            player_id,
            score: submission.score,
            avg_mic_level: submission.avg_mic_level,
            max_mic_level: submission.max_mic_level,
            duration_seconds: submission.duration_seconds,
            created_at: now,
        };
        inner.games.push(game.clone());

        if inner.fail_stats_updates {
            inner.games.retain(|g| g.id != game.id);
            return ServiceError::internal("stats update failed");
        }
        let index = match inner.stats.iter().position(|s| s.player_id == player_id) {
            Some(index) => index,
            None => {
                inner.stats.push(PlayerStats::empty(player_id, now));
                inner.stats.len() - 1
            }
        };
        inner.stats[index].record_score(game.score, now);
        let stats = inner.stats[index].clone();
        Ok((game, stats))
    }

    async fn get_games_by_player(&self, player_id: PlayerId) -> ServiceResult<Vec<Game>> {
        let inner = self.inner.lock().unwrap();
        let mut games: Vec<Game> = inner
            .games
            .iter()
            .filter(|g| g.player_id == player_id)
            .cloned()
            .collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(games)
    }
}

#[async_trait::async_trait]
impl StatsRepository for MockStore {
    async fn get_player_stats(&self, player_id: PlayerId) -> ServiceResult<Option<PlayerStats>> {
        Ok(self.stats_of(player_id))
    }

    async fn get_leaderboard(&self, limit: usize) -> ServiceResult<Vec<LeaderboardEntry>> {
        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<LeaderboardEntry> = inner
            .stats
            .iter()
            .filter_map(|stats| {
                let player = inner.players.iter().find(|p| p.id == stats.player_id)?;
                Some(LeaderboardEntry {
                    username: player.username.clone(),
                    stats: stats.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.stats
                .best_score
                .cmp(&a.stats.best_score)
                .then(a.stats.player_id.cmp(&b.stats.player_id))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

/// Issues `token-for-<username>` and accepts only tokens of that shape.
pub struct MockJwtService;

impl JwtService for MockJwtService {
    fn session_ttl(&self) -> Duration {
        Duration::minutes(60)
    }

    fn issue(&self, username: &PlayerUsername, _now: DateTime<Utc>) -> ServiceResult<String> {
        Ok(format!("token-for-{}", username))
    }

    fn validate(
        &self,
        token: Option<&str>,
        _now: DateTime<Utc>,
    ) -> Result<PlayerUsername, AuthError> {
        let token = token.ok_or(AuthError::Missing)?;
        match token.strip_prefix("token-for-") {
            Some("") => Err(AuthError::NoSubject),
            Some(username) => Ok(username.to_string()),
            None => Err(AuthError::Malformed),
        }
    }
}
