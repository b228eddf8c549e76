use arcade_server_domain::{
    ServiceError, ServiceResult,
    credentials::CredentialManager,
    player::{Player, PlayerId, PlayerRepository, validate_credentials},
};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::{is_unique_violation, millis_to_datetime, storage_error};

pub struct SqlitePlayerRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePlayerRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Creates an account outside the HTTP flow, under the same input rules
    /// as registration.
    pub async fn add_user(
        &self,
        credentials: &CredentialManager,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Player> {
        validate_credentials(username, password)?;
        let password_hash = credentials.hash(password)?;
        self.create_player(username, &password_hash, now).await
    }

    fn player_from_row(row: &SqliteRow) -> sqlx::Result<Player> {
        Ok(Player {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            created_at: millis_to_datetime(row.try_get("created_at")?)?,
        })
    }
}

#[async_trait::async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        let row = sqlx::query("SELECT * FROM players WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;
        row.as_ref()
            .map(Self::player_from_row)
            .transpose()
            .map_err(storage_error)
    }

    async fn get_player_by_name(&self, name: &str) -> ServiceResult<Option<Player>> {
        let row = sqlx::query("SELECT * FROM players WHERE username = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;
        row.as_ref()
            .map(Self::player_from_row)
            .transpose()
            .map_err(storage_error)
    }

    async fn create_player(
        &self,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Player> {
        let created_at = now.timestamp_millis();
        let stored_at = millis_to_datetime(created_at).map_err(storage_error)?;
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let id = match sqlx::query(
            "INSERT INTO players (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        {
            Ok(res) => res.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => {
                return ServiceError::bad_request("Username already exists");
            }
            Err(e) => return Err(storage_error(e)),
        };

        sqlx::query("INSERT INTO player_stats (player_id, updated_at) VALUES (?, ?)")
            .bind(id)
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        Ok(Player {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: stored_at,
        })
    }

    async fn delete_player(&self, id: PlayerId) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query("DELETE FROM games WHERE player_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        sqlx::query("DELETE FROM player_stats WHERE player_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        let res = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;
        Ok(res.rows_affected() > 0)
    }
}
