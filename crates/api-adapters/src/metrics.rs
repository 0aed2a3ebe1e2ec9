//! Prometheus counters, rendered in the OpenMetrics text format at `/metrics`.

use prometheus_client::encoding::{text::encode, EncodeLabelSet};
use prometheus_client::metrics::{counter::Counter, family::Family};
use prometheus_client::registry::Registry;

pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct RequestLabels {
    method: String,
    status: String,
}

pub struct Metrics {
    registry: Registry,
    requests: Family<RequestLabels, Counter>,
    rate_limited: Counter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("promo_board");
        let requests = Family::<RequestLabels, Counter>::default();
        let rate_limited = Counter::default();

        registry.register("http_requests", "HTTP requests handled, by method and status", requests.clone());
        registry.register(
            "auth_rate_limited",
            "Register and login attempts rejected by the rate limiter",
            rate_limited.clone(),
        );

        Self { registry, requests, rate_limited }
    }

    pub fn record_request(&self, method: &str, status: u16) {
        self.requests
            .get_or_create(&RequestLabels { method: method.to_owned(), status: status.to_string() })
            .inc();
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.inc();
    }

    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}
