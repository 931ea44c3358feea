pub mod alerts_handler;
pub mod auth_handler;
pub mod backend_health;
pub mod health_data;
pub mod patients_handler;
pub mod prediction_handler;
pub mod registration_handler;
pub mod sync_handler;

use actix_web::HttpResponse;
use serde_json::json;

use crate::middleware::auth::Claims;
use crate::services::PatientRegistry;

/// Resolve the `{patient_id}` path segment ("me", a "P<N>" code, or a raw
/// account id) to the account the request may act on. Patients can only
/// reach their own data; doctors can reach any resolvable patient.
pub(crate) async fn resolve_target(
    claims: &Claims,
    patient_input: &str,
    registry: &PatientRegistry,
) -> Result<String, HttpResponse> {
    if patient_input == "me" {
        return Ok(claims.account_id().to_string());
    }

    let resolved = match registry.resolve(patient_input).await {
        Ok(Some(account_id)) => account_id,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(json!({
                "status": "error",
                "message": format!("Patient {} not found", patient_input)
            })))
        }
        Err(e) => {
            tracing::error!("Store error resolving {}: {}", patient_input, e);
            return Err(HttpResponse::InternalServerError().finish());
        }
    };

    if !claims.is_doctor() && resolved != claims.account_id() {
        return Err(HttpResponse::Forbidden().json(json!({
            "status": "error",
            "message": "Patients can only access their own data"
        })));
    }

    Ok(resolved)
}
