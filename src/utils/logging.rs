use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Initialize tracing/logging for the application.
///
/// `RUST_LOG`, when set, takes precedence over `settings.level`.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(normalize_level(&settings.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // Use try_init so tests and libraries can call this multiple times without panicking
    let _ = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn normalize_level(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        for level in ["info", "debug", "WARNING", "bogus"] {
            init(&LoggingSettings {
                level: level.to_string(),
                json: false,
            });
        }
        init(&LoggingSettings {
            level: "info".to_string(),
            json: true,
        });
    }

    #[test]
    fn normalize_level_falls_back_to_info() {
        assert_eq!(normalize_level("Warning"), "warn");
        assert_eq!(normalize_level("TRACE"), "trace");
        assert_eq!(normalize_level("loud"), "info");
    }
}
