use std::sync::Arc;

use domains::RateLimiter;
use services::Services;

use crate::metrics::Metrics;

/// Shared by every handler; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Counts register and login attempts per caller IP
    pub login_limiter: Arc<dyn RateLimiter>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(services: Services, login_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            services,
            login_limiter,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
