use serde::{Deserialize, Serialize};

/// Denormalized display info kept alongside a patient code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    /// Short human-facing code, e.g. "P7".
    pub code: String,
    /// Opaque account id issued at signup.
    pub account_id: String,
    pub name: String,
    pub email: String,
}

/// Stored record under `patient_info/{code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub email: String,
    pub uid: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolvePatientRequest {
    pub patient_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResolvePatientResponse {
    pub code: String,
    pub account_id: String,
    pub patient_info: Option<PatientRecord>,
}

#[derive(Debug, Deserialize)]
pub struct AddPatientRequest {
    /// Code or raw account id; resolved before the list is touched.
    pub patient_id: String,
}
