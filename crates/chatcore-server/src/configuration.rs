use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitSettings {
    /// Upper bound on lines accepted in one stream body
    #[serde(default = "default_max_stream_lines")]
    pub max_stream_lines: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_stream_lines: default_max_stream_lines(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub limits: LimitSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("limits.max_stream_lines", default_max_stream_lines() as u64)?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("CHATCORE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::from(err)
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = self.server.socket_addr() {
            return Err(ConfigError::Invalid {
                env_var: to_env_var("server.host"),
                reason: err.to_string(),
            });
        }
        if self.limits.max_stream_lines == 0 {
            return Err(ConfigError::Invalid {
                env_var: to_env_var("limits.max_stream_lines"),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_stream_lines() -> usize {
    100_000
}
