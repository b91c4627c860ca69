pub mod config;
pub mod models;
pub mod storage;
pub mod telemetry;

pub mod api;
pub mod redirect;
