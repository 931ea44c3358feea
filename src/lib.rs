use actix_web::dev::Server;
use actix_web::{http, web, App, HttpServer};
use actix_cors::Cors;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub mod config;
mod handlers;
mod middleware;
pub mod models;
pub mod provider;
mod routes;
pub mod services;
pub mod store;
pub mod utils;

use crate::config::jwt::JwtSettings;
use crate::routes::init_routes;
use crate::services::{
    AlertService, DoctorListService, PatientRegistry, PredictionClient, ProjectionService,
    SyncScheduler, SyncService,
};
use crate::store::KeyedStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn KeyedStore>,
    jwt_settings: JwtSettings,
    sync_service: Arc<SyncService>,
    scheduler: Arc<SyncScheduler>,
    prediction: PredictionClient,
) -> Result<Server, std::io::Error> {
    // Everything reads and writes through the same keyed store, so the
    // view services are cheap handles constructed once here.
    let store_data = web::Data::new(store.clone());
    let jwt_settings = web::Data::new(jwt_settings);
    let sync_service = web::Data::new(sync_service);
    let scheduler = web::Data::new(scheduler);
    let prediction = web::Data::new(prediction);
    let registry = web::Data::new(PatientRegistry::new(store.clone()));
    let projection = web::Data::new(ProjectionService::new(store.clone()));
    let alerts = web::Data::new(AlertService::new(store.clone()));
    let doctor_list = web::Data::new(DoctorListService::new(store));

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:5173")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Get a pointer copy and attach it to the application state
            .app_data(store_data.clone())
            .app_data(jwt_settings.clone())
            .app_data(sync_service.clone())
            .app_data(scheduler.clone())
            .app_data(prediction.clone())
            .app_data(registry.clone())
            .app_data(projection.clone())
            .app_data(alerts.clone())
            .app_data(doctor_list.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
