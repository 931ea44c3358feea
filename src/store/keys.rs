//! Canonical key layout of the account-scoped keyspace.
//!
//! ```text
//! health_data:{accountId}:current
//! health_data:{accountId}:daily:{YYYY-MM-DD}
//! health_data:{accountId}:history:{timestampMs}
//! users:{accountId}
//! patient_mappings:{code}
//! patient_info:{code}
//! doctor_patient_lists:{doctorAccountId}
//! doctor_removed_patients:{doctorAccountId}:{accountId}
//! notifications_read:{accountId}:{alertId}
//! sync_status:{accountId}
//! ```

pub fn current(account_id: &str) -> String {
    format!("health_data:{}:current", account_id)
}

pub fn daily(account_id: &str, date: &str) -> String {
    format!("health_data:{}:daily:{}", account_id, date)
}

pub fn history(account_id: &str, timestamp_ms: i64) -> String {
    format!("health_data:{}:history:{}", account_id, timestamp_ms)
}

pub fn history_prefix(account_id: &str) -> String {
    format!("health_data:{}:history:", account_id)
}

/// Millisecond timestamp portion of a history key, used as the stable part
/// of derived alert ids.
pub fn history_entry_id(key: &str) -> &str {
    key.rsplit(':').next().unwrap_or(key)
}

pub fn user(account_id: &str) -> String {
    format!("users:{}", account_id)
}

pub fn users_prefix() -> &'static str {
    "users:"
}

pub fn patient_mapping(code: &str) -> String {
    format!("patient_mappings:{}", code)
}

pub fn patient_mappings_prefix() -> &'static str {
    "patient_mappings:"
}

pub fn patient_info(code: &str) -> String {
    format!("patient_info:{}", code)
}

pub fn doctor_patient_list(doctor_id: &str) -> String {
    format!("doctor_patient_lists:{}", doctor_id)
}

pub fn doctor_removed_patient(doctor_id: &str, account_id: &str) -> String {
    format!("doctor_removed_patients:{}:{}", doctor_id, account_id)
}

pub fn doctor_removed_prefix(doctor_id: &str) -> String {
    format!("doctor_removed_patients:{}:", doctor_id)
}

pub fn notification_read(account_id: &str, alert_id: &str) -> String {
    format!("notifications_read:{}:{}", account_id, alert_id)
}

pub fn notifications_read_prefix(account_id: &str) -> String {
    format!("notifications_read:{}:", account_id)
}

pub fn sync_status(account_id: &str) -> String {
    format!("sync_status:{}", account_id)
}
