use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload. Derived from the user record at login, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub exp: usize, // expires at (unix timestamp)
}
