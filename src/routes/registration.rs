use std::sync::Arc;

use actix_web::{post, web, HttpResponse};

use crate::handlers::registration_handler::register_user;
use crate::models::auth::RegistrationRequest;
use crate::services::PatientRegistry;
use crate::store::KeyedStore;

#[post("/register_user")]
async fn register(
    user_form: web::Json<RegistrationRequest>,
    store: web::Data<Arc<dyn KeyedStore>>,
    registry: web::Data<PatientRegistry>,
) -> HttpResponse {
    register_user(user_form, store, registry).await
}
