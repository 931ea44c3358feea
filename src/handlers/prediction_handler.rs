use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::resolve_target;
use crate::middleware::auth::Claims;
use crate::services::prediction_client::{
    CardioProfile, PredictCardioRequest, PredictHealthRequest, PredictionError,
};
use crate::services::{PatientRegistry, PredictionClient, ProjectionService};

/// Short-horizon prediction from the six watch metrics of the latest
/// reading.
#[tracing::instrument(
    name = "Predict health state",
    skip(prediction, projection, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn predict_health(
    path: web::Path<String>,
    prediction: web::Data<PredictionClient>,
    projection: web::Data<ProjectionService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let account_id = match resolve_target(&claims, &path, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    let reading = match projection.current(&account_id).await {
        Ok(view) => match view.reading {
            Some(reading) => reading,
            None => {
                return HttpResponse::NotFound().json(json!({
                    "status": "error",
                    "message": "No health data yet; waiting for first sync"
                }))
            }
        },
        Err(e) => {
            tracing::error!("Store error: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let request = PredictHealthRequest {
        patient_id: account_id,
        health_data: (&reading).into(),
    };

    match prediction.predict_health(&request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => prediction_error_response(e),
    }
}

/// Long-horizon cardio risk; needs a complete profile on top of the watch
/// metrics.
#[tracing::instrument(
    name = "Predict cardio risk",
    skip(profile, prediction, projection, registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn predict_cardio_risk(
    path: web::Path<String>,
    profile: web::Json<CardioProfile>,
    prediction: web::Data<PredictionClient>,
    projection: web::Data<ProjectionService>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let account_id = match resolve_target(&claims, &path, &registry).await {
        Ok(account_id) => account_id,
        Err(response) => return response,
    };

    let reading = match projection.current(&account_id).await {
        Ok(view) => match view.reading {
            Some(reading) => reading,
            None => {
                return HttpResponse::NotFound().json(json!({
                    "status": "error",
                    "message": "No health data yet; waiting for first sync"
                }))
            }
        },
        Err(e) => {
            tracing::error!("Store error: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let request = PredictCardioRequest {
        patient_id: account_id,
        health_data: (&reading).into(),
        profile: profile.into_inner(),
    };

    match prediction.predict_cardio_risk(&request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => prediction_error_response(e),
    }
}

fn prediction_error_response(e: PredictionError) -> HttpResponse {
    match e {
        // Needs user input, not a retry
        PredictionError::ProfileIncomplete(field) => {
            HttpResponse::UnprocessableEntity().json(json!({
                "status": "error",
                "message": format!("Complete the profile to enable this prediction: missing {}", field)
            }))
        }
        PredictionError::Service { status, body } => {
            tracing::error!("Prediction service error {}: {}", status, body);
            HttpResponse::BadGateway().json(json!({
                "status": "error",
                "message": "Prediction service error"
            }))
        }
        PredictionError::Request(e) => {
            tracing::error!("Prediction request failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "error",
                "message": "Prediction service unreachable"
            }))
        }
    }
}
