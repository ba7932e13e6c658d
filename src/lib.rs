pub mod alerts;
pub mod api;
pub mod baseline;
pub mod config;
pub mod detection;
pub mod history;
pub mod service;
pub mod summary;
pub mod types;
pub mod users;
