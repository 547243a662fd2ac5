pub mod auth;
pub mod checkin;
pub mod config;
pub mod error;
pub mod groups;
pub mod metrics;
pub mod middleware;
pub mod practice;
pub mod review;
pub mod router;
pub mod state;
pub mod stats;
pub mod tracing;
pub mod validation;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
