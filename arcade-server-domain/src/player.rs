use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;

use crate::{
    ServiceError, ServiceResult,
    credentials::CredentialManager,
    jwt::{ArcJwtService, AuthError},
};

pub type PlayerUsername = String;

pub type PlayerId = i64;

const MAX_USERNAME_LENGTH: usize = 64;

const MAX_PASSWORD_LENGTH: usize = 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub username: PlayerUsername,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub type ArcPlayerRepository = Arc<Box<dyn PlayerRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>>;
    async fn get_player_by_name(&self, name: &str) -> ServiceResult<Option<Player>>;
    /// Inserts the player and its empty stats row as one unit.
    /// A taken username fails with [`ServiceError::BadRequest`].
    async fn create_player(
        &self,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Player>;
    /// Removes the player together with its games and stats.
    /// Returns `false` if there was no such player.
    async fn delete_player(&self, id: PlayerId) -> ServiceResult<bool>;
}

pub type ArcPlayerService = Arc<Box<dyn PlayerService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerService {
    async fn register(&self, username: &str, password: &str) -> ServiceResult<Player>;
    /// Checks the credentials and returns a fresh session token.
    async fn try_login(&self, username: &str, password: &str) -> ServiceResult<String>;
    /// Validates a session token and resolves it to a stored player.
    async fn authenticate(&self, token: Option<&str>) -> ServiceResult<Player>;
    async fn get_player(&self, id: PlayerId) -> ServiceResult<Player>;
    async fn remove_account(&self, requester: &Player, target: PlayerId) -> ServiceResult<()>;
}

pub fn validate_username(username: &str) -> ServiceResult<()> {
    if username.is_empty() {
        return ServiceError::bad_request("Username must not be empty");
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return ServiceError::bad_request(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        ));
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return ServiceError::bad_request("Username must not contain whitespace");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ServiceResult<()> {
    if password.is_empty() {
        return ServiceError::bad_request("Password must not be empty");
    }
    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return ServiceError::bad_request("Password is too long");
    }
    Ok(())
}

/// Input rules every new account must satisfy, however it is created.
pub fn validate_credentials(username: &str, password: &str) -> ServiceResult<()> {
    validate_username(username)?;
    validate_password(password)
}

pub struct PlayerServiceImpl {
    credentials: CredentialManager,
    jwt_service: ArcJwtService,
    player_repository: ArcPlayerRepository,
}

impl PlayerServiceImpl {
    pub fn new(
        credentials: CredentialManager,
        jwt_service: ArcJwtService,
        player_repository: ArcPlayerRepository,
    ) -> Self {
        Self {
            credentials,
            jwt_service,
            player_repository,
        }
    }

    async fn hash_password(&self, password: &str) -> ServiceResult<String> {
        let credentials = self.credentials;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> ServiceResult<bool> {
        let credentials = self.credentials;
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || credentials.verify(&password, &hash))
            .await
            .map_err(|e| ServiceError::Internal(format!("Verification task failed: {}", e)))
    }
}

#[async_trait::async_trait]
impl PlayerService for PlayerServiceImpl {
    async fn register(&self, username: &str, password: &str) -> ServiceResult<Player> {
        validate_credentials(username, password)?;
        if self
            .player_repository
            .get_player_by_name(username)
            .await?
            .is_some()
        {
            return ServiceError::bad_request("Username already exists");
        }
        let password_hash = self.hash_password(password).await?;
        let player = self
            .player_repository
            .create_player(username, &password_hash, Utc::now())
            .await?;
        info!("Registered player {} with id {}", player.username, player.id);
        Ok(player)
    }

    async fn try_login(&self, username: &str, password: &str) -> ServiceResult<String> {
        let Some(player) = self.player_repository.get_player_by_name(username).await? else {
            return ServiceError::unauthorized(AuthError::WrongCredentials);
        };
        if !self
            .verify_password(password, &player.password_hash)
            .await?
        {
            return ServiceError::unauthorized(AuthError::WrongCredentials);
        }
        let token = self.jwt_service.issue(&player.username, Utc::now())?;
        info!("Player {} logged in", player.username);
        Ok(token)
    }

    async fn authenticate(&self, token: Option<&str>) -> ServiceResult<Player> {
        let username = self.jwt_service.validate(token, Utc::now())?;
        match self.player_repository.get_player_by_name(&username).await? {
            Some(player) => Ok(player),
            None => ServiceError::unauthorized(AuthError::UnknownUser),
        }
    }

    async fn get_player(&self, id: PlayerId) -> ServiceResult<Player> {
        match self.player_repository.get_player_by_id(id).await? {
            Some(player) => Ok(player),
            None => ServiceError::not_found("Player not found"),
        }
    }

    async fn remove_account(&self, requester: &Player, target: PlayerId) -> ServiceResult<()> {
        if requester.id != target {
            return ServiceError::forbidden("Players can only delete their own account");
        }
        if !self.player_repository.delete_player(target).await? {
            return ServiceError::not_found("Player not found");
        }
        info!("Deleted player {} with id {}", requester.username, target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        credentials::HashConfig,
        mock::{MockJwtService, MockStore},
    };

    use super::*;

    fn player_service(store: &MockStore) -> PlayerServiceImpl {
        PlayerServiceImpl::new(
            CredentialManager::new(HashConfig { cost: 4 }),
            Arc::new(Box::new(MockJwtService)),
            Arc::new(Box::new(store.clone())),
        )
    }

    #[tokio::test]
    async fn test_register_creates_player_and_stats() {
        let store = MockStore::default();
        let service = player_service(&store);

        let player = service
            .register("alice", "secret")
            .await
            .expect("Failed to register");
        assert_eq!(player.username, "alice");
        assert_ne!(player.password_hash, "secret");

        let stats = store.stats_of(player.id).expect("Stats should exist");
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.best_score, 0);
        assert_eq!(stats.avg_score, 0.0);
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let store = MockStore::default();
        let service = player_service(&store);

        service.register("alice", "secret").await.unwrap();
        assert!(matches!(
            service.register("alice", "other").await,
            Err(ServiceError::BadRequest(..))
        ));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let store = MockStore::default();
        let service = player_service(&store);

        for (username, password) in [("", "pw"), ("a b", "pw"), ("bob", "")] {
            assert!(matches!(
                service.register(username, password).await,
                Err(ServiceError::BadRequest(..))
            ));
        }
        let long_name = "n".repeat(MAX_USERNAME_LENGTH + 1);
        assert!(service.register(&long_name, "pw").await.is_err());
    }

    #[tokio::test]
    async fn test_login() {
        let store = MockStore::default();
        let service = player_service(&store);
        service.register("alice", "secret").await.unwrap();

        let token = service.try_login("alice", "secret").await.unwrap();
        assert_eq!(token, "token-for-alice");

        assert!(matches!(
            service.try_login("alice", "wrong").await,
            Err(ServiceError::Unauthorized(AuthError::WrongCredentials))
        ));
        assert!(matches!(
            service.try_login("nobody", "secret").await,
            Err(ServiceError::Unauthorized(AuthError::WrongCredentials))
        ));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = MockStore::default();
        let service = player_service(&store);
        let alice = service.register("alice", "secret").await.unwrap();

        let player = service
            .authenticate(Some("token-for-alice"))
            .await
            .unwrap();
        assert_eq!(player, alice);

        assert!(matches!(
            service.authenticate(None).await,
            Err(ServiceError::Unauthorized(AuthError::Missing))
        ));
        assert!(matches!(
            service.authenticate(Some("garbage")).await,
            Err(ServiceError::Unauthorized(AuthError::Malformed))
        ));
        assert!(matches!(
            service.authenticate(Some("token-for-ghost")).await,
            Err(ServiceError::Unauthorized(AuthError::UnknownUser))
        ));
    }

    #[tokio::test]
    async fn test_token_outlives_deleted_account() {
        let store = MockStore::default();
        let service = player_service(&store);
        let alice = service.register("alice", "secret").await.unwrap();
        let token = service.try_login("alice", "secret").await.unwrap();

        service.remove_account(&alice, alice.id).await.unwrap();
        assert!(matches!(
            service.authenticate(Some(&token)).await,
            Err(ServiceError::Unauthorized(AuthError::UnknownUser))
        ));
    }

    #[tokio::test]
    async fn test_remove_account() {
        let store = MockStore::default();
        let service = player_service(&store);
        let alice = service.register("alice", "secret").await.unwrap();
        let bob = service.register("bob", "secret").await.unwrap();

        assert!(matches!(
            service.remove_account(&alice, bob.id).await,
            Err(ServiceError::Forbidden(..))
        ));
        assert!(service.get_player(bob.id).await.is_ok());

        service.remove_account(&alice, alice.id).await.unwrap();
        assert!(matches!(
            service.get_player(alice.id).await,
            Err(ServiceError::NotFound(..))
        ));
        assert!(store.stats_of(alice.id).is_none());
    }
}
