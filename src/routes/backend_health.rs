use actix_web::{get, Responder};

use crate::handlers::backend_health::health_check;

#[get("/backend_health")]
async fn backend_health() -> impl Responder {
    health_check().await
}
