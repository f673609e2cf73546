mod settings;

use std::path::Path;

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{BrokerSettings, LoggingSettings, MetricsSettings, Settings};

/// Prefix of the environment variables read by [`load_config`], e.g.
/// `REALBROKER_BROKER__SUBSCRIBER_CAPACITY=64`.
pub const ENV_PREFIX: &str = "REALBROKER";

/// Loads the configuration from `config/default` (any format the `config`
/// crate understands, optional) and environment variables, merged over the
/// default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    build(File::with_name("config/default").required(false))
}

/// Same as [`load_config`] but reads the given file, which must exist.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    build(File::from(path.as_ref()).required(true))
}

fn build<S>(file: S) -> Result<Settings, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    let settings = partial.merge_with_defaults();
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.broker.subscriber_capacity == 0 {
        return Err(ConfigError::Message(
            "broker.subscriber_capacity must be at least 1".to_string(),
        ));
    }
    if settings.metrics.namespace.is_empty() {
        return Err(ConfigError::Message(
            "metrics.namespace must not be empty".to_string(),
        ));
    }
    Ok(())
}
