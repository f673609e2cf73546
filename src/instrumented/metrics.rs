//! Prometheus metrics recorded around broker calls.
//!
//! All metrics follow the naming convention `<namespace>_<metric>_<unit>`,
//! `broker_service` by default:
//!
//! - `method_count_total{method,status}` counter, status is `success` or `error`
//! - `method_duration_seconds{method}` histogram
//! - `active_subscribers` gauge
//!
//! Each `BrokerMetrics` owns its own `Registry`, so several brokers (and
//! tests) never share counters.

use std::fmt;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::config::MetricsSettings;

#[derive(Clone)]
pub struct BrokerMetrics {
    registry: Registry,
    method_count: IntCounterVec,
    method_duration: HistogramVec,
    active_subscribers: IntGauge,
}

impl BrokerMetrics {
    pub fn new(namespace: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let method_count = IntCounterVec::new(
            Opts::new(
                "method_count_total",
                "Total number of broker calls by method and status",
            )
            .namespace(namespace),
            &["method", "status"],
        )?;
        let method_duration = HistogramVec::new(
            HistogramOpts::new("method_duration_seconds", "Duration of broker calls")
                .namespace(namespace),
            &["method"],
        )?;
        let active_subscribers = IntGauge::with_opts(
            Opts::new(
                "active_subscribers",
                "Number of subscriptions currently held by consumers",
            )
            .namespace(namespace),
        )?;

        registry.register(Box::new(method_count.clone()))?;
        registry.register(Box::new(method_duration.clone()))?;
        registry.register(Box::new(active_subscribers.clone()))?;

        Ok(Self {
            registry,
            method_count,
            method_duration,
            active_subscribers,
        })
    }

    pub fn from_settings(settings: &MetricsSettings) -> Result<Self, prometheus::Error> {
        Self::new(&settings.namespace)
    }

    /// Also export resident/virtual memory, CPU time and open descriptors of
    /// the current process on this registry.
    #[cfg(target_os = "linux")]
    pub fn with_process_metrics(self) -> Result<Self, prometheus::Error> {
        let collector = prometheus::process_collector::ProcessCollector::for_self();
        self.registry.register(Box::new(collector))?;
        Ok(self)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every metric of the registry in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub(crate) fn record_call(&self, method: &str, ok: bool, seconds: f64) {
        let status = if ok { "success" } else { "error" };
        self.method_count
            .with_label_values(&[method, status])
            .inc();
        self.method_duration
            .with_label_values(&[method])
            .observe(seconds);
    }

    pub(crate) fn active_subscribers_gauge(&self) -> &IntGauge {
        &self.active_subscribers
    }

    /// Calls of `method` that ended with `status` (`success` or `error`).
    pub fn calls(&self, method: &str, status: &str) -> u64 {
        self.method_count
            .with_label_values(&[method, status])
            .get()
    }

    /// Number of duration samples recorded for `method`.
    pub fn timed_calls(&self, method: &str) -> u64 {
        self.method_duration
            .with_label_values(&[method])
            .get_sample_count()
    }

    pub fn active_subscribers(&self) -> i64 {
        self.active_subscribers.get()
    }
}

impl fmt::Debug for BrokerMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerMetrics")
            .field("active_subscribers", &self.active_subscribers.get())
            .finish()
    }
}
