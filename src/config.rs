// src/config.rs - connection settings for a printer and its camera endpoint
use std::fs::File;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Connection settings for one printer. Drivers take this instead of a
/// constructor signature being forced into the `Printer` trait.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrinterConfig {
    pub ip_address: String,
    pub access_code: String,
    pub serial: String,
    #[serde(default = "default_camera_port")]
    pub camera_port: u16,
    #[serde(default = "default_camera_username")]
    pub camera_username: String,
}

/// Camera endpoint settings, derived from [`PrinterConfig`] or built directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CameraConfig {
    pub hostname: String,
    pub access_code: String,
    #[serde(default = "default_camera_port")]
    pub port: u16,
    #[serde(default = "default_camera_username")]
    pub username: String,
}

fn default_camera_port() -> u16 {
    6000
}

fn default_camera_username() -> String {
    "bblp".to_string()
}

impl PrinterConfig {
    pub fn new(ip_address: &str, access_code: &str, serial: &str) -> Self {
        Self {
            ip_address: ip_address.to_string(),
            access_code: access_code.to_string(),
            serial: serial.to_string(),
            camera_port: default_camera_port(),
            camera_username: default_camera_username(),
        }
    }

    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ip_address.is_empty() {
            return Err(ConfigError::Invalid("ip_address cannot be empty".to_string()));
        }
        if self.access_code.is_empty() {
            return Err(ConfigError::Invalid("access_code cannot be empty".to_string()));
        }
        if self.serial.is_empty() {
            return Err(ConfigError::Invalid("serial cannot be empty".to_string()));
        }
        Ok(())
    }

    /// The camera endpoint this printer exposes: same host and access code,
    /// camera port and user.
    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            hostname: self.ip_address.clone(),
            access_code: self.access_code.clone(),
            port: self.camera_port,
            username: self.camera_username.clone(),
        }
    }
}

pub fn load_config(path: &str) -> Result<PrinterConfig, ConfigError> {
    tracing::info!("Loading printer config from: {}", path);
    let mut content = String::new();
    File::open(path)?.read_to_string(&mut content)?;
    PrinterConfig::parse_toml(&content)
}
