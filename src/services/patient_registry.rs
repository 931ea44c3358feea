//! Identity resolution between human-facing patient codes ("P<N>") and
//! opaque account ids, plus code assignment at signup.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::models::patient::{PatientInfo, PatientRecord};
use crate::store::{keys, KeyedStore, StoreError};

const CODE_PREFIX: char = 'P';

pub struct PatientRegistry {
    store: Arc<dyn KeyedStore>,
}

impl PatientRegistry {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Resolve a code or raw account id to an account id. Inputs that do
    /// not look like a code are assumed to already be account ids and pass
    /// through unchanged; an unmapped code resolves to `None`.
    pub async fn resolve(&self, code_or_id: &str) -> Result<Option<String>, StoreError> {
        if code_or_id.is_empty() {
            return Ok(None);
        }
        if !code_or_id.starts_with(CODE_PREFIX) {
            return Ok(Some(code_or_id.to_string()));
        }

        let value = self.store.get(&keys::patient_mapping(code_or_id)).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }

    /// First code mapping to `account_id`, if any. Linear scan over the
    /// mapping table; fine while the table stays small, a reverse index is
    /// the fix if it ever is not.
    pub async fn reverse_lookup(&self, account_id: &str) -> Result<Option<String>, StoreError> {
        let mappings = self.store.list(keys::patient_mappings_prefix()).await?;
        for (key, value) in mappings {
            if value.as_str() == Some(account_id) {
                let code = key
                    .strip_prefix(keys::patient_mappings_prefix())
                    .unwrap_or(&key);
                return Ok(Some(code.to_string()));
            }
        }
        Ok(None)
    }

    /// Assign the next available code to an account. Idempotent: an account
    /// that already has a code gets the existing one back. The scan-max
    /// allocation is a read-then-write and can race under concurrent
    /// signups; accepted at this scale.
    pub async fn assign_code(
        &self,
        account_id: &str,
        name: &str,
        email: &str,
    ) -> Result<String, StoreError> {
        if let Some(existing) = self.reverse_lookup(account_id).await? {
            tracing::info!("Account {} already has code {}", account_id, existing);
            return Ok(existing);
        }

        let mappings = self.store.list(keys::patient_mappings_prefix()).await?;
        let max_assigned = mappings
            .iter()
            .filter_map(|(key, _)| {
                key.strip_prefix(keys::patient_mappings_prefix())
                    .and_then(|code| code.strip_prefix(CODE_PREFIX))
                    .and_then(|n| n.parse::<u64>().ok())
            })
            .max()
            .unwrap_or(0);

        let code = format!("{}{}", CODE_PREFIX, max_assigned + 1);
        self.store
            .put(&keys::patient_mapping(&code), Value::String(account_id.to_string()))
            .await?;
        self.store
            .put(
                &keys::patient_info(&code),
                json!({ "name": name, "email": email, "uid": account_id }),
            )
            .await?;

        tracing::info!("✅ Assigned code {} to account {}", code, account_id);
        Ok(code)
    }

    pub async fn patient_info(&self, code: &str) -> Result<Option<PatientRecord>, StoreError> {
        let value = self.store.get(&keys::patient_info(code)).await?;
        Ok(value.and_then(|v| serde_json::from_value(v).ok()))
    }

    /// All registered patients, sorted by code.
    pub async fn all_patients(&self) -> Result<Vec<PatientInfo>, StoreError> {
        let mappings = self.store.list(keys::patient_mappings_prefix()).await?;
        let mut patients = Vec::with_capacity(mappings.len());
        for (key, value) in mappings {
            let code = key
                .strip_prefix(keys::patient_mappings_prefix())
                .unwrap_or(&key)
                .to_string();
            let account_id = match value.as_str() {
                Some(id) => id.to_string(),
                None => continue,
            };
            let info = self.patient_info(&code).await?;
            let (name, email) = info
                .map(|i| (i.name, i.email))
                .unwrap_or_else(|| ("Unknown".to_string(), String::new()));
            patients.push(PatientInfo {
                code,
                account_id,
                name,
                email,
            });
        }
        // Assignment order, not text order: "P10" comes after "P2"
        patients.sort_by_key(|p| code_ordinal(&p.code));
        Ok(patients)
    }
}

/// Numeric suffix of a code, for sorting. Malformed codes sort last, by
/// text.
fn code_ordinal(code: &str) -> (u64, String) {
    match code
        .strip_prefix(CODE_PREFIX)
        .and_then(|n| n.parse::<u64>().ok())
    {
        Some(n) => (n, String::new()),
        None => (u64::MAX, code.to_string()),
    }
}
