pub mod client;
pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod telemetry;
