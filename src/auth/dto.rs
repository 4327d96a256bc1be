use serde::{Deserialize, Serialize};

/// Every user payload, inbound and outbound, is wrapped under a "user" key.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserBody<T> {
    pub user: T,
}

/// Registration and login fields are optional so missing ones surface
/// field-level validation errors instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginUser {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub email: String,
    pub username: String,
    pub token: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}
