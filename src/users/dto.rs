use serde::Deserialize;

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

/// Request body for `PUT /users/{id}`; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
}

/// Query string for `GET /users`. Numbers stay raw so that junk values fall
/// back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
}
