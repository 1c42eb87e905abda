pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod models;
pub mod negotiation;
pub mod openapi;
pub mod startup;

use std::sync::Arc;

pub use config::AppConfig;
pub use engine::OfferEngine;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

#[derive(Clone)]
pub struct AppState {
    pub engine: OfferEngine,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}
