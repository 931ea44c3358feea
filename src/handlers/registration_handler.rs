use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::json;
use uuid::Uuid;

use crate::models::auth::{RegistrationRequest, RegistrationResponse};
use crate::models::user::{StoredUser, UserRole};
use crate::services::PatientRegistry;
use crate::store::{keys, KeyedStore, StoreError};
use crate::utils::password::hash_password;

#[tracing::instrument(
    name = "Adding a new user",
    // Don't show the password
    skip(user_form, store, registry),
    fields(
        email = %user_form.email,
        role = %user_form.role
    )
)]
pub async fn register_user(
    user_form: web::Json<RegistrationRequest>,
    store: web::Data<Arc<dyn KeyedStore>>,
    registry: web::Data<PatientRegistry>,
) -> HttpResponse {
    // Emails identify accounts at login, so a second registration with
    // the same address is rejected rather than shadowing the first.
    match email_taken(&user_form.email, &store).await {
        Ok(false) => {}
        Ok(true) => {
            tracing::info!("Registration rejected: email already in use");
            return HttpResponse::Conflict().json(json!({
                "status": "error",
                "message": "An account with this email already exists"
            }));
        }
        Err(e) => {
            tracing::error!("Store error occurred: {:?}", e);
            return HttpResponse::InternalServerError().finish();
        }
    }

    match insert_user(&user_form, &store, &registry).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            tracing::error!("Failed to register user: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "status": "error",
                "message": "Registration failed"
            }))
        }
    }
}

async fn email_taken(email: &str, store: &Arc<dyn KeyedStore>) -> Result<bool, StoreError> {
    let users = store.list(keys::users_prefix()).await?;
    Ok(users.into_iter().any(|(_, value)| {
        serde_json::from_value::<StoredUser>(value)
            .map(|user| user.email == email)
            .unwrap_or(false)
    }))
}

async fn insert_user(
    user_form: &RegistrationRequest,
    store: &Arc<dyn KeyedStore>,
    registry: &PatientRegistry,
) -> Result<RegistrationResponse, StoreError> {
    let account_id = Uuid::new_v4().to_string();

    let mut user = StoredUser {
        email: user_form.email.clone(),
        full_name: user_form.full_name.clone(),
        role: user_form.role,
        password_hash: hash_password(user_form.password.expose_secret()),
        patient_id: None,
        created_at: Utc::now(),
    };

    // Patient accounts get the next "P<N>" code at signup; the user record
    // carries it denormalized for display.
    if user.role == UserRole::Patient {
        let code = registry
            .assign_code(&account_id, &user.full_name, &user.email)
            .await?;
        user.patient_id = Some(code);
    }

    let value = serde_json::to_value(&user).expect("StoredUser is always serializable");
    store.put(&keys::user(&account_id), value).await?;

    Ok(RegistrationResponse {
        patient_id: user.patient_id,
        account_id,
    })
}
