use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, UserChanges, UserFilter};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence boundary for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn update_fields(&self, id: Uuid, changes: UserChanges)
        -> Result<Option<User>, StoreError>;
    /// Returns whether a row was removed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at, updated_at";

/// Escapes LIKE metacharacters so the search term matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            _ => StoreError::Database(e),
        })
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name = COALESCE($2, name),
                   role = COALESCE($3, role),
                   updated_at = $4
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.role)
        .bind(changes.updated_at)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        // The ORDER BY column comes from the SortField whitelist, never from input.
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
              FROM users
             WHERE $1::text IS NULL OR name ILIKE $1 OR email ILIKE $1
             ORDER BY {} ASC, id ASC
             LIMIT $2 OFFSET $3
            "#,
            filter.sort.column()
        );
        let pattern = filter
            .search
            .as_deref()
            .map(|term| format!("%{}%", escape_like(term)));
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(pattern)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}
