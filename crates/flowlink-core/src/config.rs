//! Flowlink configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file
//! exists. Environment variables override the file; CLI flags override both.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowlinkConfig {
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    pub data: DataConfig,
}

/// Gateway configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub port: u16,
    pub bind: BindMode,
}

fn default_port() -> u16 {
    3000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: BindMode::default(),
        }
    }
}

/// Bind mode for the gateway
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    Loopback,
    #[default]
    Lan,
}

impl BindMode {
    pub fn to_addr(&self) -> &str {
        match self {
            BindMode::Loopback => "127.0.0.1",
            BindMode::Lan => "0.0.0.0",
        }
    }
}

impl std::str::FromStr for BindMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "loopback" | "localhost" | "127.0.0.1" => Ok(BindMode::Loopback),
            "lan" | "0.0.0.0" => Ok(BindMode::Lan),
            _ => Err(format!("Unknown bind mode: {}", s)),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// HMAC secret used to sign bearer tokens.
    pub secret: String,
    pub username: String,
    pub password: String,
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            secret: "redit".into(),
            username: "alice".into(),
            password: "admin".into(),
            token_ttl_secs: 3600,
        }
    }
}

/// Authentication mode
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Token,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the five collection files.
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("info_doc"),
        }
    }
}

impl FlowlinkConfig {
    /// Load from a TOML file. A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = toml::from_str(&content)
                    .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {} — using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `PORT`, `JWT_SECRET`, `USER_NAME`, `PASSWORD` and `FLOWLINK_DATA_DIR`.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = var("PORT") {
            self.gateway.port = port
                .parse()
                .map_err(|_| Error::ConfigError(format!("PORT is not a port number: {}", port)))?;
        }
        if let Some(secret) = var("JWT_SECRET") {
            self.auth.secret = secret;
        }
        if let Some(username) = var("USER_NAME") {
            self.auth.username = username;
        }
        if let Some(password) = var("PASSWORD") {
            self.auth.password = password;
        }
        if let Some(dir) = var("FLOWLINK_DATA_DIR") {
            self.data.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Render as TOML; `flowlink config` prints the defaults this way.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigError(e.to_string()))
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
