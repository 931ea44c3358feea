use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// A derived alert. Alerts are recomputed from the full history on every
/// read and never persisted themselves; the id is a pure function of the
/// history key and the rule that fired, so a previously acknowledged alert
/// keeps its read flag across recomputations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub category: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub alerts: Vec<AlertRecord>,
    pub unread_count: usize,
}
