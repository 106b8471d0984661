use std::cmp::Ordering;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, SortField, User, UserChanges, UserFilter},
};

/// Case-insensitive substring match on name or email, as `ILIKE` does.
fn search_matches(filter: &UserFilter, user: &User) -> bool {
    match &filter.search {
        None => true,
        Some(term) => {
            let term = term.to_lowercase();
            user.name.to_lowercase().contains(&term) || user.email.to_lowercase().contains(&term)
        }
    }
}

/// Ascending on the field, `id` as tie-breaker.
fn compare(field: SortField, a: &User, b: &User) -> Ordering {
    let primary = match field {
        SortField::Id => Ordering::Equal,
        SortField::Email => a.email.cmp(&b.email),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Role => a.role.cmp(&b.role),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// In-process `UserStore` used by unit and router tests.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let stored = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = changes.updated_at;
        Ok(Some(user.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut matched: Vec<User> = users.iter().filter(|u| search_matches(filter, u)).cloned().collect();
        matched.sort_by(|a, b| compare(filter.sort, a, b));
        Ok(matched
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn new_user(email: &str, name: &str) -> NewUser {
        let now = OffsetDateTime::now_utc();
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            name: name.into(),
            role: "user".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn filter(search: Option<&str>, sort: SortField) -> UserFilter {
        UserFilter {
            skip: 0,
            limit: 10,
            sort,
            search: search.map(String::from),
        }
    }

    #[tokio::test]
    async fn search_matches_name_or_email_ignoring_case() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("ada@lovelace.dev", "Ada")).await.unwrap();
        store.insert(new_user("x@example.com", "Grace Lovelace")).await.unwrap();
        store.insert(new_user("alan@turing.dev", "Alan")).await.unwrap();

        let found = store.list(&filter(Some("LOVE"), SortField::Name)).await.unwrap();
        let names: Vec<_> = found.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Grace Lovelace"]);
    }

    #[tokio::test]
    async fn insert_enforces_unique_email() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("dup@example.com", "A")).await.unwrap();
        let err = store.insert(new_user("dup@example.com", "B")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("gone@example.com", "Gone")).await.unwrap();
        assert!(store.delete_by_id(user.id).await.unwrap());
        assert!(!store.delete_by_id(user.id).await.unwrap());
        assert!(store.list(&filter(None, SortField::Id)).await.unwrap().is_empty());
    }
}
