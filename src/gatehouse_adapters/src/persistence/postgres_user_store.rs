use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use gatehouse_core::domain::display_name::DisplayName;
use gatehouse_core::domain::email::EmailAddress;
use gatehouse_core::domain::password::PasswordHash;
use gatehouse_core::domain::user::{Role, User, UserId};
use gatehouse_core::domain::username::Username;
use gatehouse_core::ports::store::{UserStore, UserStoreError};

/// Upper bound on any single round trip to Postgres.
const CALL_DEADLINE: Duration = Duration::from_secs(5);

/// User store over a Postgres pool. Uniqueness is enforced by the schema:
/// a unique index on `LOWER(username)` and a partial unique index on `email`
/// where `is_email_verified` - violations map to the conflict errors.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), UserStoreError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| UserStoreError::Backend(e.to_string()))
    }
}

async fn bounded<T>(
    fut: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, sqlx::Error> {
    tokio::time::timeout(CALL_DEADLINE, fut)
        .await
        .map_err(|_| sqlx::Error::PoolTimedOut)?
}

fn backend(e: sqlx::Error) -> UserStoreError {
    UserStoreError::Backend(e.to_string())
}

/// Maps a unique-key violation to the matching conflict error by constraint
/// name; anything else stays a backend error.
fn map_conflict(e: sqlx::Error) -> UserStoreError {
    if let Some(db_err) = e.as_database_error() {
        if let Some(constraint) = db_err.constraint() {
            if constraint.contains("username") {
                return UserStoreError::UsernameTaken;
            }
            if constraint.contains("email") {
                return UserStoreError::EmailTaken;
            }
        }
    }
    backend(e)
}

fn row_to_user(row: &PgRow) -> Result<User, UserStoreError> {
    let invalid = |what: &str| UserStoreError::Backend(format!("stored {what} failed validation"));

    let id: Uuid = row.try_get("id").map_err(backend)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(backend)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(backend)?;
    let name: String = row.try_get("name").map_err(backend)?;
    let username: String = row.try_get("username").map_err(backend)?;
    let email: String = row.try_get("email").map_err(backend)?;
    let password_hash: String = row.try_get("password_hash").map_err(backend)?;
    let is_email_verified: bool = row.try_get("is_email_verified").map_err(backend)?;
    let role: String = row.try_get("role").map_err(backend)?;
    let avatar_url: Option<String> = row.try_get("avatar_url").map_err(backend)?;

    Ok(User {
        id: UserId::parse(&id.to_string()).map_err(|_| invalid("id"))?,
        created_at,
        updated_at,
        name: DisplayName::parse(&name).map_err(|_| invalid("name"))?,
        username: Username::parse(&username).map_err(|_| invalid("username"))?,
        email: EmailAddress::parse(&email).map_err(|_| invalid("email"))?,
        password_hash: PasswordHash::new(password_hash),
        is_email_verified,
        role: match role.as_str() {
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => return Err(invalid("role")),
        },
        avatar_url,
    })
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::User => "user",
    }
}

const USER_COLUMNS: &str = "id, created_at, updated_at, name, username, email, \
                            password_hash, is_email_verified, role, avatar_url";

#[async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "PostgresUserStore::get_by_id", skip_all)]
    async fn get_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = bounded(
            sqlx::query(&query)
                .bind(id.as_uuid())
                .fetch_optional(&self.pool),
        )
        .await
        .map_err(backend)?
        .ok_or(UserStoreError::NotFound)?;

        row_to_user(&row)
    }

    #[tracing::instrument(name = "PostgresUserStore::get_by_username", skip_all)]
    async fn get_by_username(&self, username: &str) -> Result<User, UserStoreError> {
        let query =
            format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)");
        let row = bounded(
            sqlx::query(&query)
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await
        .map_err(backend)?
        .ok_or(UserStoreError::NotFound)?;

        row_to_user(&row)
    }

    #[tracing::instrument(name = "PostgresUserStore::get_id_by_verified_email", skip_all)]
    async fn get_id_by_verified_email(&self, email: &str) -> Result<UserId, UserStoreError> {
        let row = bounded(
            sqlx::query("SELECT id FROM users WHERE email = $1 AND is_email_verified")
                .bind(email)
                .fetch_optional(&self.pool),
        )
        .await
        .map_err(backend)?
        .ok_or(UserStoreError::NotFound)?;

        let id: Uuid = row.try_get("id").map_err(backend)?;
        UserId::parse(&id.to_string())
            .map_err(|_| UserStoreError::Backend("stored id failed validation".to_owned()))
    }

    #[tracing::instrument(name = "PostgresUserStore::create", skip_all)]
    async fn create(&self, user: User) -> Result<(), UserStoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO users
                (id, created_at, updated_at, name, username, email,
                 password_hash, is_email_verified, role, avatar_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.name.as_str())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.expose())
        .bind(user.is_email_verified)
        .bind(role_str(user.role))
        .bind(user.avatar_url.as_deref());

        bounded(query.execute(&self.pool))
            .await
            .map_err(map_conflict)?;
        Ok(())
    }

    #[tracing::instrument(name = "PostgresUserStore::update_password", skip_all)]
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: PasswordHash,
    ) -> Result<(), UserStoreError> {
        let result = bounded(
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
                .bind(password_hash.expose())
                .bind(id.as_uuid())
                .execute(&self.pool),
        )
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "PostgresUserStore::set_email_verified", skip_all)]
    async fn set_email_verified(&self, id: &UserId) -> Result<(), UserStoreError> {
        let result = bounded(
            sqlx::query(
                "UPDATE users SET is_email_verified = TRUE, updated_at = now() WHERE id = $1",
            )
            .bind(id.as_uuid())
            .execute(&self.pool),
        )
        .await
        .map_err(map_conflict)?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "PostgresUserStore::update_avatar", skip_all)]
    async fn update_avatar(&self, id: &UserId, url: &str) -> Result<(), UserStoreError> {
        let result = bounded(
            sqlx::query("UPDATE users SET avatar_url = $1, updated_at = now() WHERE id = $2")
                .bind(url)
                .bind(id.as_uuid())
                .execute(&self.pool),
        )
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "PostgresUserStore::delete_avatar", skip_all)]
    async fn delete_avatar(&self, id: &UserId) -> Result<(), UserStoreError> {
        let result = bounded(
            sqlx::query("UPDATE users SET avatar_url = NULL, updated_at = now() WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool),
        )
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::NotFound);
        }
        Ok(())
    }
}
