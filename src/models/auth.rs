use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::models::user::{UserResponse, UserRole};

#[derive(Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(deserialize_with = "deserialize_secret_string")]
    pub password: SecretString,
}

impl fmt::Display for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email: {}, Role: {}", self.email, self.role)
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(deserialize_with = "deserialize_secret_string")]
    pub password: SecretString,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

pub fn deserialize_secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s.into_boxed_str()))
}
