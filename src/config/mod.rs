pub mod jwt;
pub mod prediction;
pub mod redis;
pub mod settings;
