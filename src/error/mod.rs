mod app;
mod config;
mod http;
mod sink;
mod stats;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use sink::SinkError;
pub use stats::StatsError;
pub use validation::ValidationError;
