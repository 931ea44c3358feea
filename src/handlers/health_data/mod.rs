pub mod get_health_data;
