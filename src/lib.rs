pub mod agents;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod ids;
pub mod provider;
pub mod routing;
pub mod telemetry;
pub mod tools;
pub mod workflow;
