pub mod config;
pub mod error;
pub mod import;
pub mod surveillance;
pub mod telemetry;
