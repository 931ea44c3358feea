use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use crate::services::sync_service::SyncService;

/// Fires the 15-minute cadence. The scheduler keys jobs by account so a new
/// trigger never stacks a second periodic job on the same account.
const SYNC_CRON: &str = "0 0/15 * * * *";

pub struct SyncScheduler {
    scheduler: Arc<Mutex<JobScheduler>>,
    sync_service: Arc<SyncService>,
    // account id -> scheduled job id
    active_jobs: Arc<Mutex<HashMap<String, Uuid>>>,
}

impl SyncScheduler {
    pub async fn new(sync_service: Arc<SyncService>) -> Result<Self, Box<dyn Error>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            sync_service,
            active_jobs: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error>> {
        let scheduler = self.scheduler.lock().await;
        scheduler.start().await?;

        tracing::info!("✅ Sync scheduler started");
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), Box<dyn Error>> {
        let mut scheduler = self.scheduler.lock().await;
        scheduler.shutdown().await?;

        tracing::info!("🛑 Sync scheduler stopped");
        Ok(())
    }

    /// Schedule the periodic sync for an account. Idempotent: an account
    /// with a live job keeps it.
    pub async fn schedule_account(&self, account_id: String) -> Result<(), JobSchedulerError> {
        {
            let active_jobs = self.active_jobs.lock().await;
            if active_jobs.contains_key(&account_id) {
                tracing::debug!("Account {} already scheduled", account_id);
                return Ok(());
            }
        }

        let scheduler = self.scheduler.lock().await;
        let sync_service = self.sync_service.clone();
        let account_for_job = account_id.clone();

        let sync_job = Job::new_async(SYNC_CRON, move |_uuid, _l| {
            let sync_service = sync_service.clone();
            let account_id = account_for_job.clone();

            Box::pin(async move {
                match sync_service.run_once(Some(&account_id)).await {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => {
                        // Needs user action; the job stays scheduled but
                        // every tick will keep failing until they act.
                        tracing::error!("Periodic sync for {} needs user action: {}", account_id, e);
                    }
                    Err(e) => {
                        tracing::warn!("Periodic sync for {} will retry next tick: {}", account_id, e);
                    }
                }
            })
        })?;

        let job_id = sync_job.guid();
        scheduler.add(sync_job).await?;

        let mut active_jobs = self.active_jobs.lock().await;
        active_jobs.insert(account_id.clone(), job_id);

        tracing::info!("✅ Scheduled periodic sync for account {} (every 15 minutes)", account_id);

        Ok(())
    }

    /// Remove the periodic sync for an account (logout). An in-flight
    /// attempt is not interrupted; it runs to completion or failure.
    ///
    /// Lock order is `scheduler` before `active_jobs`, same as
    /// `schedule_account`; the map entry is taken out first, without
    /// holding either lock across the other's acquisition.
    pub async fn unschedule_account(&self, account_id: &str) -> Result<(), Box<dyn Error>> {
        let removed = {
            let mut active_jobs = self.active_jobs.lock().await;
            active_jobs.remove(account_id)
        };

        if let Some(job_id) = removed {
            let scheduler = self.scheduler.lock().await;
            if let Err(e) = scheduler.remove(&job_id).await {
                // Put the entry back so a retry can still find the job
                drop(scheduler);
                let mut active_jobs = self.active_jobs.lock().await;
                active_jobs.insert(account_id.to_string(), job_id);
                return Err(e.into());
            }
            tracing::info!("✅ Removed periodic sync for account {}", account_id);
        }

        Ok(())
    }

    pub async fn is_scheduled(&self, account_id: &str) -> bool {
        self.active_jobs.lock().await.contains_key(account_id)
    }
}
