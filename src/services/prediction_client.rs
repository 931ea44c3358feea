//! HTTP client for the external prediction microservice. The service is an
//! opaque collaborator; only the request/response shapes matter here.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::prediction::PredictionSettings;
use crate::models::health_data::Reading;

#[derive(Debug, Error)]
pub enum PredictionError {
    /// Required profile field missing; needs user input, never retried.
    #[error("profile incomplete: missing {0}")]
    ProfileIncomplete(&'static str),
    #[error("prediction service error: {status} - {body}")]
    Service { status: u16, body: String },
    #[error("prediction request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// The six watch metrics as the prediction service expects them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetricsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    pub workout: f64,
}

impl From<&Reading> for HealthMetricsPayload {
    fn from(reading: &Reading) -> Self {
        Self {
            heart_rate: reading.heart_rate,
            steps: reading.steps,
            calories: reading.calories,
            distance: reading.distance_km,
            sleep_hours: reading.sleep_hours,
            workout: reading.workout_minutes(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictHealthRequest {
    pub patient_id: String,
    pub health_data: HealthMetricsPayload,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictHealthResponse {
    pub health_risk_state: String,
    pub anomaly_detected: bool,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Profile fields for the long-horizon cardio endpoint. All optional at the
/// boundary; completeness is validated before the request goes out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardioProfile {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub smoking: Option<bool>,
    pub alcohol: Option<bool>,
    pub physical_activity: Option<bool>,
}

impl CardioProfile {
    fn validate(&self) -> Result<(), PredictionError> {
        if self.age.is_none() {
            return Err(PredictionError::ProfileIncomplete("age"));
        }
        if self.gender.is_none() {
            return Err(PredictionError::ProfileIncomplete("gender"));
        }
        if self.height_cm.is_none() {
            return Err(PredictionError::ProfileIncomplete("heightCm"));
        }
        if self.weight_kg.is_none() {
            return Err(PredictionError::ProfileIncomplete("weightKg"));
        }
        if self.smoking.is_none() {
            return Err(PredictionError::ProfileIncomplete("smoking"));
        }
        if self.alcohol.is_none() {
            return Err(PredictionError::ProfileIncomplete("alcohol"));
        }
        if self.physical_activity.is_none() {
            return Err(PredictionError::ProfileIncomplete("physicalActivity"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PredictCardioRequest {
    pub patient_id: String,
    pub health_data: HealthMetricsPayload,
    pub profile: CardioProfile,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictCardioResponse {
    pub risk_level: String,
    pub probability: f64,
}

pub struct PredictionClient {
    base_url: String,
    api_key: SecretString,
    client: Client,
}

impl PredictionClient {
    pub fn new(settings: &PredictionSettings) -> Self {
        Self {
            base_url: settings.service_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            client: Client::new(),
        }
    }

    pub async fn predict_health(
        &self,
        request: &PredictHealthRequest,
    ) -> Result<PredictHealthResponse, PredictionError> {
        self.post("predict_health", request).await
    }

    pub async fn predict_cardio_risk(
        &self,
        request: &PredictCardioRequest,
    ) -> Result<PredictCardioResponse, PredictionError> {
        request.profile.validate()?;
        self.post("predict_cardio_risk", request).await
    }

    async fn post<Req, Resp>(&self, endpoint: &str, request: &Req) -> Result<Resp, PredictionError>
    where
        Req: Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        tracing::debug!("🤖 Calling prediction service at {}", url);

        let response = self
            .client
            .post(&url)
            .header("X-API-Key", self.api_key.expose_secret())
            .json(request)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("❌ Prediction service returned error {}: {}", status, body);
            return Err(PredictionError::Service { status, body });
        }

        Ok(response.json::<Resp>().await?)
    }
}
