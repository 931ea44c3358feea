use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::resolve_target;
use crate::middleware::auth::Claims;
use crate::models::alert::AlertListResponse;
use crate::services::alert_engine::{risk_level, unread_count};
use crate::services::{AlertService, PatientRegistry, ProjectionService};

#[tracing::instrument(
    name = "List alerts",
    skip(alerts, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn list_alerts(
    path: web::Path<String>,
    alerts: web::Data<AlertService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let account_id = match resolve_target(&claims, &path, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    let derived = match alerts.alerts_for(&account_id).await {
        Ok(derived) => derived,
        Err(e) => {
            tracing::error!("Store error: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };
    let read_ids = match alerts.read_ids(&account_id).await {
        Ok(read_ids) => read_ids,
        Err(e) => {
            tracing::error!("Store error: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let unread = unread_count(&derived, &read_ids);
    HttpResponse::Ok().json(AlertListResponse {
        alerts: derived,
        unread_count: unread,
    })
}

#[tracing::instrument(
    name = "Unread alert count",
    skip(alerts, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn get_unread_count(
    path: web::Path<String>,
    alerts: web::Data<AlertService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let account_id = match resolve_target(&claims, &path, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    match alerts.unread_count_for(&account_id).await {
        Ok(count) => HttpResponse::Ok().json(json!({ "unread_count": count })),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(
    name = "Mark alert read",
    skip(alerts, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn mark_read(
    path: web::Path<(String, String)>,
    alerts: web::Data<AlertService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let (patient_input, alert_id) = path.into_inner();
    let account_id = match resolve_target(&claims, &patient_input, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    match alerts.mark_read(&account_id, &alert_id).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(
    name = "Mark all alerts read",
    skip(alerts, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn mark_all_read(
    path: web::Path<String>,
    alerts: web::Data<AlertService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let account_id = match resolve_target(&claims, &path, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    match alerts.mark_all_read(&account_id).await {
        Ok(marked) => HttpResponse::Ok().json(json!({ "status": "ok", "marked": marked })),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Headline badge: coarse risk classification of the latest reading only.
#[tracing::instrument(
    name = "Get risk level",
    skip(projection, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn get_risk(
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
        Ok(view) => match view.reading {
            Some(reading) => HttpResponse::Ok().json(json!({
                "risk_level": risk_level(&reading),
                "timestamp": reading.timestamp
            })),
            None => HttpResponse::Ok().json(json!({
                "risk_level": serde_json::Value::Null,
                "message": "Waiting for data"
            })),
        },
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
