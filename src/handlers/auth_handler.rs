// src/handlers/auth_handler.rs
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::ExposeSecret;

use crate::config::jwt::JwtSettings;
use crate::middleware::auth::Claims;
use crate::models::auth::{LoginRequest, LoginResponse};
use crate::models::user::{StoredUser, UserResponse};
use crate::store::{keys, KeyedStore};
use crate::utils::password::verify_password;

#[tracing::instrument(
    name = "Login user attempt",
    skip(login_form, store, jwt_settings),
    fields(
        email = %login_form.email
    )
)]
pub async fn login_user(
    login_form: web::Json<LoginRequest>,
    store: web::Data<Arc<dyn KeyedStore>>,
    jwt_settings: web::Data<JwtSettings>,
) -> HttpResponse {
    // Linear scan over the users keyspace; acceptable at this account
    // cardinality, same trade-off as the code reverse lookup.
    let users = match store.list(keys::users_prefix()).await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Store error occurred: {:?}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let found = users.into_iter().find_map(|(key, value)| {
        let user: StoredUser = serde_json::from_value(value).ok()?;
        if user.email == login_form.email {
            let account_id = key.strip_prefix(keys::users_prefix())?.to_string();
            Some((account_id, user))
        } else {
            None
        }
    });

    let (account_id, user) = match found {
        Some(found) => found,
        None => {
            tracing::info!("User not found or invalid credentials");
            return HttpResponse::Unauthorized().finish();
        }
    };

    // Verify password
    if !verify_password(login_form.password.expose_secret(), &user.password_hash) {
        tracing::info!("Invalid password");
        return HttpResponse::Unauthorized().finish();
    }

    // Generate JWT token
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(jwt_settings.expiration_hours))
        .expect("Valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: account_id.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: expiration,
    };

    let token = match encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_settings.secret.expose_secret().as_bytes()),
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to encode JWT: {:?}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    HttpResponse::Ok().json(LoginResponse {
        token,
        user: UserResponse {
            account_id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            patient_id: user.patient_id,
        },
    })
}
