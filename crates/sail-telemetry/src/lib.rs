pub mod common;
pub mod error;
pub mod recorder;
pub mod telemetry;
