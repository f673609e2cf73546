use std::time::Duration;

use serde::Deserialize;

use crate::broker::Broker;

/// Top-level configuration settings for the library.
///
/// Groups the broker core, logging and metrics settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub logging: LoggingSettings,
    pub metrics: MetricsSettings,
}

/// Configuration settings for the broker core.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    /// Buffer size of each subscription; messages beyond it are dropped for
    /// that subscriber.
    pub subscriber_capacity: usize,
    /// Period of the expiry sweep in seconds. `0` disables it.
    pub sweep_interval_secs: u64,
}

impl BrokerSettings {
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MetricsSettings {
    /// Prefix of every metric name, e.g. `broker_service_method_count_total`.
    pub namespace: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub logging: Option<PartialLoggingSettings>,
    pub metrics: Option<PartialMetricsSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub subscriber_capacity: Option<usize>,
    pub sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
    pub json: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PartialMetricsSettings {
    pub namespace: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                subscriber_capacity: Broker::DEFAULT_SUBSCRIBER_CAPACITY,
                sweep_interval_secs: 0,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json: false,
            },
            metrics: MetricsSettings {
                namespace: "broker_service".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Fill every missing value from `Settings::default()`.
    pub fn merge_with_defaults(self) -> Settings {
        let default = Settings::default();
        let broker = self.broker;
        let logging = self.logging;
        let metrics = self.metrics;

        Settings {
            broker: BrokerSettings {
                subscriber_capacity: broker
                    .as_ref()
                    .and_then(|b| b.subscriber_capacity)
                    .unwrap_or(default.broker.subscriber_capacity),
                sweep_interval_secs: broker
                    .as_ref()
                    .and_then(|b| b.sweep_interval_secs)
                    .unwrap_or(default.broker.sweep_interval_secs),
            },
            logging: LoggingSettings {
                level: logging
                    .as_ref()
                    .and_then(|l| l.level.clone())
                    .unwrap_or(default.logging.level),
                json: logging
                    .as_ref()
                    .and_then(|l| l.json)
                    .unwrap_or(default.logging.json),
            },
            metrics: MetricsSettings {
                namespace: metrics
                    .and_then(|m| m.namespace)
                    .unwrap_or(default.metrics.namespace),
            },
        }
    }
}
