pub mod alert;
pub mod auth;
pub mod health_data;
pub mod patient;
pub mod user;
