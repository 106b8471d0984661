use std::str::FromStr;

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub name: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields for a row about to be inserted; the store assigns the ID.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<String>,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Email,
    Name,
    Role,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Email => "email",
            SortField::Name => "name",
            SortField::Role => "role",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "email" => Ok(SortField::Email),
            "name" => Ok(SortField::Name),
            "role" => Ok(SortField::Role),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

/// Store-level list query.
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
    pub sort: SortField,
    pub search: Option<String>,
}
