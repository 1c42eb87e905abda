pub mod health;
pub mod locations_handler;
pub mod metrics;
pub mod offers_handler;
pub mod rpc_handler;
pub mod shifts_handler;
pub mod users_handler;

pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};
