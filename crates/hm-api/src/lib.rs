//! HTTP surface of the Hanmal review scheduler.

pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod middleware;
pub mod review;
pub mod router;
pub mod state;
pub mod tracing;

pub use config::ApiConfig;
pub use state::ApiState;
