use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::handlers::resolve_target;
use crate::middleware::auth::Claims;
use crate::services::{PatientRegistry, ProjectionService};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

#[tracing::instrument(
    name = "Get current reading",
    skip(projection, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn get_current(
    path: web::Path<String>,
    projection: web::Data<ProjectionService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let account_id = match resolve_target(&claims, &path, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    match projection.current(&account_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(
    name = "Get daily reading",
    skip(projection, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn get_daily(
    path: web::Path<(String, String)>,
    projection: web::Data<ProjectionService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let (patient_input, date) = path.into_inner();
    let account_id = match resolve_target(&claims, &patient_input, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    match projection.daily(&account_id, &date).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(
    name = "Get history page",
    skip(projection, registry, claims),
    fields(requester = %claims.sub, page = %query.page)
)]
pub async fn get_history(
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
    projection: web::Data<ProjectionService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let account_id = match resolve_target(&claims, &path, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    match projection.history_page(&account_id, query.page).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
