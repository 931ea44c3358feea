pub mod alert_engine;
pub mod collector;
pub mod doctor_list;
pub mod patient_registry;
pub mod prediction_client;
pub mod projection;
pub mod scheduler;
pub mod sync_service;
pub mod telemetry;
pub mod writer;

pub use alert_engine::AlertService;
pub use collector::HealthCollector;
pub use doctor_list::DoctorListService;
pub use patient_registry::PatientRegistry;
pub use prediction_client::PredictionClient;
pub use projection::ProjectionService;
pub use scheduler::SyncScheduler;
pub use sync_service::SyncService;
pub use writer::HealthWriter;
