use actix_web::web;

pub mod auth;
pub mod backend_health;
pub mod registration;

use crate::handlers::{
    alerts_handler, health_data::get_health_data, patients_handler, prediction_handler,
    sync_handler,
};
use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(registration::register)
        .service(backend_health::backend_health)
        .service(auth::login);

    // Sync control (requires authentication)
    cfg.service(
        web::scope("/sync")
            .wrap(AuthMiddleware)
            .service(
                web::resource("/now")
                    .route(web::post().to(sync_handler::sync_now))
            )
            .service(
                web::resource("/schedule")
                    .route(web::post().to(sync_handler::schedule_sync))
                    .route(web::delete().to(sync_handler::unschedule_sync))
            )
    );

    // Patient-scoped read side: {patient_id} is "me", a "P<N>" code, or a
    // raw account id
    cfg.service(
        web::scope("/patients")
            .wrap(AuthMiddleware)
            .service(
                web::resource("")
                    .route(web::get().to(patients_handler::get_all_patients))
            )
            .service(
                web::resource("/resolve")
                    .route(web::post().to(patients_handler::resolve_patient))
            )
            .service(
                web::resource("/{patient_id}/health/current")
                    .route(web::get().to(get_health_data::get_current))
            )
            .service(
                web::resource("/{patient_id}/health/daily/{date}")
                    .route(web::get().to(get_health_data::get_daily))
            )
            .service(
                web::resource("/{patient_id}/health/history")
                    .route(web::get().to(get_health_data::get_history))
            )
            .service(
                web::resource("/{patient_id}/risk")
                    .route(web::get().to(alerts_handler::get_risk))
            )
            .service(
                web::resource("/{patient_id}/alerts")
                    .route(web::get().to(alerts_handler::list_alerts))
            )
            .service(
                web::resource("/{patient_id}/alerts/unread_count")
                    .route(web::get().to(alerts_handler::get_unread_count))
            )
            .service(
                web::resource("/{patient_id}/alerts/read_all")
                    .route(web::post().to(alerts_handler::mark_all_read))
            )
            .service(
                web::resource("/{patient_id}/alerts/{alert_id}/read")
                    .route(web::post().to(alerts_handler::mark_read))
            )
            .service(
                web::resource("/{patient_id}/predict")
                    .route(web::post().to(prediction_handler::predict_health))
            )
            .service(
                web::resource("/{patient_id}/predict_cardio")
                    .route(web::post().to(prediction_handler::predict_cardio_risk))
            )
    );

    // Doctor list management (requires authentication; role checked in the
    // handlers)
    cfg.service(
        web::scope("/doctor")
            .wrap(AuthMiddleware)
            .service(
                web::resource("/patients")
                    .route(web::get().to(patients_handler::get_doctor_list))
                    .route(web::post().to(patients_handler::add_to_doctor_list))
            )
            .service(
                web::resource("/patients/{account_id}")
                    .route(web::delete().to(patients_handler::remove_from_doctor_list))
            )
    );
}
