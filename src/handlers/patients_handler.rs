use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::middleware::auth::Claims;
use crate::models::patient::{AddPatientRequest, ResolvePatientRequest, ResolvePatientResponse};
use crate::services::{DoctorListService, PatientRegistry};

fn require_doctor(claims: &Claims) -> Option<HttpResponse> {
    if claims.is_doctor() {
        None
    } else {
        Some(HttpResponse::Forbidden().json(json!({
            "status": "error",
            "message": "Doctor role required"
        })))
    }
}

#[tracing::instrument(
    name = "Resolve patient",
    skip(request, registry, claims),
    fields(requester = %claims.sub, patient = %request.patient_id)
)]
pub async fn resolve_patient(
    request: web::Json<ResolvePatientRequest>,
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    if let Some(denied) = require_doctor(&claims) {
        return denied;
    }

    let account_id = match registry.resolve(&request.patient_id).await {
        Ok(Some(account_id)) => account_id,
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({
                "status": "error",
                "message": "Patient not found"
            }))
        }
        Err(e) => {
            tracing::error!("Store error: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    // The code travels back alongside the resolved id so the caller can
    // keep displaying the short form
    let code = if request.patient_id.starts_with('P') {
        request.patient_id.clone()
    } else {
        match registry.reverse_lookup(&account_id).await {
            Ok(code) => code.unwrap_or_default(),
            Err(e) => {
                tracing::error!("Store error: {}", e);
                return HttpResponse::InternalServerError().finish();
            }
        }
    };

    let patient_info = match registry.patient_info(&code).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Store error: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    HttpResponse::Ok().json(ResolvePatientResponse {
        code,
        account_id,
        patient_info,
    })
}

#[tracing::instrument(
    name = "List all patients",
    skip(registry, claims),
    fields(requester = %claims.sub)
)]
pub async fn get_all_patients(
    registry: web::Data<PatientRegistry>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    if let Some(denied) = require_doctor(&claims) {
        return denied;
    }

    match registry.all_patients().await {
        Ok(patients) => HttpResponse::Ok().json(json!({ "patients": patients })),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(
    name = "Get doctor patient list",
    skip(doctor_list, claims),
    fields(doctor = %claims.sub)
)]
pub async fn get_doctor_list(
    doctor_list: web::Data<DoctorListService>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    if let Some(denied) = require_doctor(&claims) {
        return denied;
    }

    match doctor_list.list(claims.account_id()).await {
        Ok(patients) => HttpResponse::Ok().json(json!({ "patients": patients })),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(
    name = "Add patient to doctor list",
    skip(request, registry, doctor_list, claims),
    fields(doctor = %claims.sub, patient = %request.patient_id)
)]
pub async fn add_to_doctor_list(
    request: web::Json<AddPatientRequest>,
    registry: web::Data<PatientRegistry>,
    doctor_list: web::Data<DoctorListService>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    if let Some(denied) = require_doctor(&claims) {
        return denied;
    }

    let account_id = match registry.resolve(&request.patient_id).await {
        Ok(Some(account_id)) => account_id,
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({
                "status": "error",
                "message": "Patient not found"
            }))
        }
        Err(e) => {
            tracing::error!("Store error: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let patient = match registry.all_patients().await {
        Ok(patients) => patients.into_iter().find(|p| p.account_id == account_id),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };
    let patient = match patient {
        Some(patient) => patient,
        None => {
            return HttpResponse::NotFound().json(json!({
                "status": "error",
                "message": "Patient has no assigned code"
            }))
        }
    };

    match doctor_list.add(claims.account_id(), patient).await {
        Ok(patients) => HttpResponse::Ok().json(json!({ "patients": patients })),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[tracing::instrument(
    name = "Remove patient from doctor list",
    skip(doctor_list, claims),
    fields(doctor = %claims.sub)
)]
pub async fn remove_from_doctor_list(
    path: web::Path<String>,
    doctor_list: web::Data<DoctorListService>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    if let Some(denied) = require_doctor(&claims) {
        return denied;
    }

    match doctor_list.remove(claims.account_id(), &path).await {
        Ok(patients) => HttpResponse::Ok().json(json!({ "patients": patients })),
        Err(e) => {
            tracing::error!("Store error: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
