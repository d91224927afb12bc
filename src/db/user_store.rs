// User storage port and its PostgreSQL adapter
// The service layer talks to `UserStore` only; each method is a single
// document operation whose atomicity is the store's responsibility.

use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::{NewUser, User, UserChanges};

#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique index rejected the write
    #[error("Duplicate key: {field}={value}")]
    DuplicateKey { field: String, value: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection pool error: {0}")]
    Pool(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage contract for user records
///
/// Lookups and mutations addressed by id return `Ok(None)` when the id does
/// not exist; classifying that as an error is the caller's decision.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>>;

    /// Flip `is_business` atomically
    async fn toggle_business(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn promote_to_admin(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Remove the record, returning what was deleted
    async fn delete(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn health_check(&self) -> StoreResult<()>;
}

// =============================================================================
// POSTGRES ADAPTER
// =============================================================================

pub struct DieselUserStore {
    pool: DieselPool,
}

impl DieselUserStore {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> StoreResult<
        bb8::PooledConnection<
            '_,
            diesel_async::pooled_connection::AsyncDieselConnectionManager<
                diesel_async::AsyncPgConnection,
            >,
        >,
    > {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

/// Extract `(column, value)` from a PostgreSQL unique-violation detail such as
/// `Key (email)=(a@b.com) already exists.`
pub fn parse_unique_violation(details: &str) -> Option<(String, String)> {
    let rest = details.trim().strip_prefix("Key (")?;
    let (field, rest) = rest.split_once(")=(")?;
    let end = rest.rfind(") already exists")?;
    Some((field.to_string(), rest[..end].to_string()))
}

/// Map a Diesel error raised while writing `email`
fn map_write_error(error: DieselError, email: &str) -> StoreError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let (field, value) = info
                .details()
                .and_then(parse_unique_violation)
                .unwrap_or_else(|| ("email".to_string(), email.to_string()));
            StoreError::DuplicateKey { field, value }
        },
        other => map_error(other),
    }
}

fn map_error(error: DieselError) -> StoreError {
    tracing::debug!(error = %error, "diesel operation failed");
    StoreError::Database(error.to_string())
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let mut conn = self.connection().await?;
        User::find_all(&mut conn).await.map_err(map_error)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut conn = self.connection().await?;
        User::find_by_id(&mut conn, id).await.map_err(map_error)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.connection().await?;
        User::find_by_email(&mut conn, email).await.map_err(map_error)
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut conn = self.connection().await?;
        User::create(&mut conn, &user)
            .await
            .map_err(|e| map_write_error(e, &user.email))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut conn = self.connection().await?;
        User::update(&mut conn, id, &changes)
            .await
            .map_err(|e| map_write_error(e, &changes.email))
    }

    async fn toggle_business(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut conn = self.connection().await?;
        User::toggle_business(&mut conn, id).await.map_err(map_error)
    }

    async fn promote_to_admin(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut conn = self.connection().await?;
        User::promote_to_admin(&mut conn, id).await.map_err(map_error)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut conn = self.connection().await?;
        User::delete(&mut conn, id).await.map_err(map_error)
    }

    async fn health_check(&self) -> StoreResult<()> {
        // Getting a connection is enough
        let conn = self.connection().await?;
        drop(conn);
        Ok(())
    }
}
