//! HTTP client for the device gateway that fronts the phone's health-data
//! API. One GET per metric category, time range passed as RFC 3339 query
//! parameters.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use super::{
    DeviceDataProvider, ExerciseSession, HeartRateSample, IntervalRecord, MetricPermission,
    ProviderError, SleepSession, TimeRange,
};
use crate::config::settings::GatewaySettings;

pub struct DeviceGatewayClient {
    base_url: String,
    api_key: SecretString,
    client: Client,
}

impl DeviceGatewayClient {
    pub fn new(settings: &GatewaySettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            client: Client::new(),
        }
    }

    async fn fetch_records<T: DeserializeOwned>(
        &self,
        metric: &str,
        range: TimeRange,
    ) -> Result<Vec<T>, ProviderError> {
        let url = format!("{}/records/{}", self.base_url, metric);

        tracing::debug!("Querying device gateway: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", self.api_key.expose_secret())
            .query(&[
                ("start", range.start.to_rfc3339()),
                ("end", range.end.to_rfc3339()),
            ])
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Request(format!(
                "gateway returned {} for {}: {}",
                status, metric, body
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| ProviderError::InvalidPayload(e.to_string()))
    }
}

#[async_trait]
impl DeviceDataProvider for DeviceGatewayClient {
    async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Device gateway unreachable: {}", e);
                false
            }
        }
    }

    async fn granted_permissions(&self) -> Result<HashSet<MetricPermission>, ProviderError> {
        let url = format!("{}/permissions", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-API-Key", self.api_key.expose_secret())
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Request(format!(
                "gateway returned {} for permissions",
                response.status()
            )));
        }

        response
            .json::<HashSet<MetricPermission>>()
            .await
            .map_err(|e| ProviderError::InvalidPayload(e.to_string()))
    }

    async fn heart_rate_samples(
        &self,
        range: TimeRange,
    ) -> Result<Vec<HeartRateSample>, ProviderError> {
        self.fetch_records("heart_rate", range).await
    }

    async fn step_records(&self, range: TimeRange) -> Result<Vec<IntervalRecord>, ProviderError> {
        self.fetch_records("steps", range).await
    }

    async fn calorie_records(
        &self,
        range: TimeRange,
    ) -> Result<Vec<IntervalRecord>, ProviderError> {
        self.fetch_records("calories", range).await
    }

    async fn distance_records(
        &self,
        range: TimeRange,
    ) -> Result<Vec<IntervalRecord>, ProviderError> {
        self.fetch_records("distance", range).await
    }

    async fn sleep_sessions(&self, range: TimeRange) -> Result<Vec<SleepSession>, ProviderError> {
        self.fetch_records("sleep", range).await
    }

    async fn exercise_sessions(
        &self,
        range: TimeRange,
    ) -> Result<Vec<ExerciseSession>, ProviderError> {
        self.fetch_records("exercise", range).await
    }
}
