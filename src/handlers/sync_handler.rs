use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::middleware::auth::Claims;
use crate::models::health_data::SyncResponse;
use crate::services::sync_service::SyncError;
use crate::services::{SyncScheduler, SyncService};

/// On-demand single-shot sync for the authenticated account. Shares the
/// pipeline with the periodic job.
#[tracing::instrument(
    name = "Sync now",
    skip(sync_service, claims),
    fields(account_id = %claims.sub)
)]
pub async fn sync_now(
    sync_service: web::Data<Arc<SyncService>>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    match sync_service.run_once(Some(claims.account_id())).await {
        Ok(reading) => HttpResponse::Ok().json(SyncResponse {
            success: true,
            message: "Health data synced successfully".to_string(),
            timestamp: Utc::now(),
            reading: Some(reading),
        }),
        Err(e) => {
            let response = SyncResponse {
                success: false,
                message: format!("Failed to sync health data: {}", e),
                timestamp: Utc::now(),
                reading: None,
            };
            match e {
                SyncError::NotAuthenticated => HttpResponse::Unauthorized().json(response),
                SyncError::MissingPermissions(_) => {
                    HttpResponse::PreconditionFailed().json(response)
                }
                // Retryable for the job runner; for a manual run the client
                // just tries again
                SyncError::ProviderUnavailable | SyncError::Store(_) => {
                    HttpResponse::ServiceUnavailable().json(response)
                }
            }
        }
    }
}

#[tracing::instrument(
    name = "Schedule periodic sync",
    skip(scheduler, claims),
    fields(account_id = %claims.sub)
)]
pub async fn schedule_sync(
    scheduler: web::Data<Arc<SyncScheduler>>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    match scheduler
        .schedule_account(claims.account_id().to_string())
        .await
    {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "scheduled",
            "interval_minutes": 15
        })),
        Err(e) => {
            tracing::error!("Failed to schedule sync: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(
    name = "Unschedule periodic sync",
    skip(scheduler, claims),
    fields(account_id = %claims.sub)
)]
pub async fn unschedule_sync(
    scheduler: web::Data<Arc<SyncScheduler>>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    match scheduler.unschedule_account(claims.account_id()).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "unscheduled" })),
        Err(e) => {
            tracing::error!("Failed to unschedule sync: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
