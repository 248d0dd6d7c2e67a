// config/mod.rs
use crate::transport::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_DRAIN_TIMEOUT, DEFAULT_PORT, Endpoint, TelnetSender,
};
use config::Config;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "unique_device_names"))]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerSettings,
    #[serde(default)]
    #[validate(nested)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    #[validate(nested)]
    pub transport: TransportSettings,
    #[serde(default)]
    #[validate(nested)]
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct MetricsSettings {
    pub enabled: bool,
    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9000,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TransportSettings {
    #[validate(range(min = 1))]
    pub connect_timeout_ms: u64,
    #[validate(range(min = 1))]
    pub drain_timeout_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            drain_timeout_ms: DEFAULT_DRAIN_TIMEOUT.as_millis() as u64,
        }
    }
}

impl TransportSettings {
    pub fn sender(&self) -> TelnetSender {
        TelnetSender::new(
            Duration::from_millis(self.connect_timeout_ms),
            Duration::from_millis(self.drain_timeout_ms),
        )
    }
}

/// One relay entry: `{ name?, host, port = 9093 }`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeviceConfig {
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub host: String,
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,
}

impl DeviceConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn unique_device_names(settings: &Settings) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for device in &settings.devices {
        let name = device
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(crate::devices::DEFAULT_NAME);
        if !seen.insert(name) {
            let mut err = ValidationError::new("duplicate_device_name");
            err.message = Some(format!("device name {name:?} is used more than once").into());
            return Err(err);
        }
    }
    Ok(())
}

/// `APP_SERVER__ADDRESS` overrides `server.address`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::with_name("config/config").required(false))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
