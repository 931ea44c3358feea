//! Doctor-curated patient lists with a parallel removed-set.
//!
//! Removing a patient records them in the removed-set so any automated
//! re-add stays suppressed; an explicit re-add clears the flag again.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::models::patient::PatientInfo;
use crate::store::{keys, KeyedStore, StoreError};

pub struct DoctorListService {
    store: Arc<dyn KeyedStore>,
}

impl DoctorListService {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, doctor_id: &str) -> Result<Vec<PatientInfo>, StoreError> {
        let value = self.store.get(&keys::doctor_patient_list(doctor_id)).await?;
        Ok(match value {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => Vec::new(),
        })
    }

    /// Add a patient. Idempotent on account id; a manual add also clears
    /// the removed flag so the patient is not suppressed forever.
    pub async fn add(
        &self,
        doctor_id: &str,
        patient: PatientInfo,
    ) -> Result<Vec<PatientInfo>, StoreError> {
        let mut list = self.list(doctor_id).await?;
        if !list.iter().any(|p| p.account_id == patient.account_id) {
            list.push(patient.clone());
            self.save(doctor_id, &list).await?;
        }
        self.store
            .delete(&keys::doctor_removed_patient(doctor_id, &patient.account_id))
            .await?;
        Ok(list)
    }

    /// Remove a patient and record them as manually removed.
    pub async fn remove(
        &self,
        doctor_id: &str,
        account_id: &str,
    ) -> Result<Vec<PatientInfo>, StoreError> {
        let mut list = self.list(doctor_id).await?;
        list.retain(|p| p.account_id != account_id);
        self.save(doctor_id, &list).await?;
        self.store
            .put(
                &keys::doctor_removed_patient(doctor_id, account_id),
                json!(true),
            )
            .await?;
        Ok(list)
    }

    /// Account ids this doctor has manually removed.
    pub async fn removed(&self, doctor_id: &str) -> Result<Vec<String>, StoreError> {
        let prefix = keys::doctor_removed_prefix(doctor_id);
        let entries = self.store.list(&prefix).await?;
        Ok(entries
            .into_iter()
            .filter(|(_, v)| *v == Value::Bool(true))
            .map(|(k, _)| k.strip_prefix(&prefix).unwrap_or(&k).to_string())
            .collect())
    }

    async fn save(&self, doctor_id: &str, list: &[PatientInfo]) -> Result<(), StoreError> {
        let value = serde_json::to_value(list).expect("patient list is always serializable");
        self.store
            .put(&keys::doctor_patient_list(doctor_id), value)
            .await
    }
}
