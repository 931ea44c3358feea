// src/routes/auth.rs
use std::sync::Arc;

use actix_web::{post, web, HttpResponse};

use crate::config::jwt::JwtSettings;
use crate::handlers::auth_handler::login_user;
use crate::models::auth::LoginRequest;
use crate::store::KeyedStore;

#[post("/login")]
async fn login(
    login_form: web::Json<LoginRequest>,
    store: web::Data<Arc<dyn KeyedStore>>,
    jwt_settings: web::Data<JwtSettings>,
) -> HttpResponse {
    login_user(login_form, store, jwt_settings).await
}
