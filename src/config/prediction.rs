use secrecy::SecretString;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct PredictionSettings {
    pub service_url: String,
    pub api_key: SecretString,
}

impl PredictionSettings {
    pub fn new(service_url: String, api_key: SecretString) -> Self {
        Self {
            service_url,
            api_key,
        }
    }
}
