use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{dto::LoginResponse, jwt::JwtKeys, password::{verify_against_dummy, verify_password}},
    error::AppError,
    users::repo::UserStore,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Credential check and token issuance.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    /// Unknown email and wrong password fail with the same error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_by_email(&email).await? else {
            verify_against_dummy(password.to_owned()).await;
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let ok = verify_password(password.to_owned(), user.password_hash.clone()).await?;

        if !ok {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.sign(&user)?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok(LoginResponse { token })
    }
}
