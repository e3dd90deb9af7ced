mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, LoggingSettings, ServerSettings, Settings};

/// Prefix of the environment variables read by `load_config`,
/// e.g. `ACKQUEUE__BROKER__TTL_MS=250`.
pub const ENV_PREFIX: &str = "ACKQUEUE";

const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Loads the configuration from `config/default` (if present) and the
/// environment, merged over the default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Same as `load_config`, reading the optional file at `path` instead.
/// The extension may be omitted; any format supported by `config` works.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    let settings = Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        broker: BrokerSettings {
            ttl_ms: partial
                .broker
                .as_ref()
                .and_then(|b| b.ttl_ms)
                .unwrap_or(default.broker.ttl_ms),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    };

    if settings.broker.ttl_ms == 0 {
        return Err(ConfigError::Message(
            "broker.ttl_ms must be greater than zero".to_string(),
        ));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests;
