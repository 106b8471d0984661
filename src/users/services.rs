use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        password::hash_password,
        services::{is_valid_email, normalize_email},
    },
    error::AppError,
    users::{
        dto::{CreateUserRequest, ListQuery, UpdateUserRequest},
        repo::UserStore,
        repo_types::{NewUser, SortField, User, UserChanges, UserFilter},
    },
};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalized listing parameters. Pages are 1-based.
///
/// `page_size` is clamped to `MAX_PAGE_SIZE` before the offset is computed, so
/// a client asking for `page=3&page_size=500` gets rows 200..300, not 1000..1100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: i64,
    pub page_size: i64,
    pub sort: Option<String>,
    pub search: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            search: None,
        }
    }
}

fn positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|v| *v > 0)
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<ListQuery> for ListParams {
    fn from(q: ListQuery) -> Self {
        Self {
            page: positive(q.page.as_deref()).unwrap_or(1),
            page_size: positive(q.page_size.as_deref())
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
            sort: non_blank(q.sort),
            search: non_blank(q.search),
        }
    }
}

impl ListParams {
    fn to_filter(&self) -> Result<UserFilter, AppError> {
        let page = self.page.max(1);
        let page_size = if self.page_size > 0 {
            self.page_size.min(MAX_PAGE_SIZE)
        } else {
            DEFAULT_PAGE_SIZE
        };
        let sort = match self.sort.as_deref() {
            None => SortField::CreatedAt,
            Some(field) => field.parse::<SortField>().map_err(|e| {
                warn!(reason = %e, "rejected sort field");
                AppError::validation("invalid sort field")
            })?,
        };
        Ok(UserFilter {
            skip: (page - 1).saturating_mul(page_size),
            limit: page_size,
            sort,
            search: self.search.clone().filter(|s| !s.is_empty()),
        })
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::validation("invalid user id"))
}

fn required(value: &str, message: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(value.to_string())
}

/// Create/list/update/delete over the user store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn create(&self, req: CreateUserRequest) -> Result<User, AppError> {
        let email = normalize_email(&req.email);
        if !is_valid_email(&email) {
            return Err(AppError::validation("invalid email"));
        }
        if req.password.is_empty() {
            return Err(AppError::validation("password is required"));
        }
        let name = required(&req.name, "name is required")?;
        let role = required(&req.role, "role is required")?;

        let password_hash = hash_password(req.password).await?;

        let now = OffsetDateTime::now_utc();
        let user = self
            .store
            .insert(NewUser {
                email,
                password_hash,
                name,
                role,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.store.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: ListParams) -> Result<Vec<User>, AppError> {
        let filter = params.to_filter()?;
        let users = self.store.list(&filter).await?;
        debug!(count = users.len(), skip = filter.skip, limit = filter.limit, "users listed");
        Ok(users)
    }

    #[instrument(skip(self, req))]
    pub async fn update(&self, id: &str, req: UpdateUserRequest) -> Result<User, AppError> {
        let id = parse_id(id)?;
        let changes = UserChanges {
            name: req
                .name
                .map(|name| required(&name, "name must not be blank"))
                .transpose()?,
            role: req
                .role
                .map(|role| required(&role, "role must not be blank"))
                .transpose()?,
            updated_at: OffsetDateTime::now_utc(),
        };
        let user = self
            .store
            .update_fields(id, changes)
            .await?
            .ok_or(AppError::NotFound)?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Deleting an absent ID succeeds, same as deleting an existing one.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(id)?;
        if self.store.delete_by_id(id).await? {
            info!(user_id = %id, "user deleted");
        } else {
            debug!(user_id = %id, "delete of absent user");
        }
        Ok(())
    }
}
