use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

/// Failures of the hashing primitive. A wrong password is not an error.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("argon2 hashing failed: {0}")]
    Hash(password_hash::Error),

    #[error("stored password hash is unreadable: {0}")]
    MalformedHash(password_hash::Error),

    #[error("password task aborted: {0}")]
    Task(#[from] JoinError),
}

lazy_static! {
    // Verified against when the email is unknown so both login failures cost
    // one argon2 verification.
    static ref DUMMY_HASH: Option<String> = hash_blocking("no-such-account").ok();
}

fn hash_blocking(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(PasswordError::Hash)
}

fn verify_blocking(plain: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(PasswordError::MalformedHash)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Salted argon2id PHC string for `plain`, computed off the async runtime.
pub async fn hash_password(plain: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_blocking(&plain))
        .await?
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            e
        })
}

/// Constant-time check of `plain` against a stored PHC string.
pub async fn verify_password(plain: String, stored: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_blocking(&plain, &stored))
        .await?
        .map_err(|e| {
            error!(error = %e, "password verification failed");
            e
        })
}

/// Spends one verification's worth of work; the outcome is discarded.
pub async fn verify_against_dummy(plain: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify_blocking(&plain, dummy);
        }
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_hash_never_equals_plaintext() {
        for plain in ["pa55word", "", "ünïcödé passphrase"] {
            let stored = hash_password(plain.to_string()).await.unwrap();
            assert_ne!(stored, plain);
            assert!(!stored.contains(plain) || plain.is_empty());
            assert!(stored.starts_with("$argon2id$"));
        }
    }

    #[tokio::test]
    async fn login_check_accepts_only_the_registered_password() {
        let stored = hash_password("open sesame".into()).await.unwrap();
        assert!(verify_password("open sesame".into(), stored.clone()).await.unwrap());
        assert!(!verify_password("open sesame ".into(), stored.clone()).await.unwrap());
        assert!(!verify_password("OPEN SESAME".into(), stored).await.unwrap());
    }

    #[tokio::test]
    async fn re_registering_a_password_produces_a_new_salt() {
        let first = hash_password("shared".into()).await.unwrap();
        let second = hash_password("shared".into()).await.unwrap();
        assert_ne!(first, second);
        assert!(verify_password("shared".into(), second).await.unwrap());
    }

    #[tokio::test]
    async fn corrupted_record_is_an_error_not_a_mismatch() {
        let err = verify_password("anything".into(), "plaintext-in-db".into())
            .await
            .unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[tokio::test]
    async fn dummy_hash_is_a_real_argon2_record() {
        let dummy = DUMMY_HASH.clone().expect("dummy hash computed");
        assert!(dummy.starts_with("$argon2id$"));
        assert!(!verify_password("guess".into(), dummy).await.unwrap());
        verify_against_dummy("guess".into()).await;
    }
}
