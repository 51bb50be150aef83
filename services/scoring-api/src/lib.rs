//! Plant health scoring API
//!
//! Stateless HTTP service exposing:
//! - `GET /health` liveness check
//! - `GET /predict` scores freshly sampled field conditions
//!
//! Every failure, panics included, is answered with a JSON 500 and the
//! server keeps serving.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use handlers::{HealthResponse, PredictResponse};

/// Service router with all routes and middleware
pub fn router() -> Router {
    with_middleware(
        Router::new()
            .route("/health", get(handlers::health_check))
            .route("/predict", get(handlers::predict)),
    )
}

/// Apply the shared middleware stack to `routes`
pub fn with_middleware(routes: Router) -> Router {
    routes.layer(ServiceBuilder::new().layer(CatchPanicLayer::custom(error::handle_panic)))
}
