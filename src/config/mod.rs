// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub access: AccessConfig,
    #[serde(default)]
    pub presets: PresetConfig,
}

// Default worker thread count
fn default_threads() -> usize {
    4
}

// Default upstream timeout in seconds
fn default_timeout() -> u64 {
    20
}

fn default_client_ip_header() -> String {
    "cf-connecting-ip".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Number of worker threads (default: 4)
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Upstream connect/read/write timeout in seconds (default: 20)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Access control configuration: who may call the gateway and which
/// origins a source image URL may point at. Loaded once at startup and
/// never reloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Trusted front-end header carrying the caller's network identity.
    /// Absence of this header on a request is a 400.
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,

    /// Exact-match caller identity allowlist.
    pub allowed_client_ips: Vec<String>,

    /// Exact-match hostname allowlist for source image URLs.
    pub allowed_source_origins: Vec<String>,
}

fn default_thumbnail() -> u32 {
    150
}

fn default_small() -> u32 {
    320
}

fn default_medium() -> u32 {
    640
}

fn default_large() -> u32 {
    1024
}

/// Named output-size presets. Each value is one square pixel dimension
/// applied to both width and height when the caller asks for the preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default = "default_thumbnail")]
    pub thumbnail: u32,
    #[serde(default = "default_small")]
    pub small: u32,
    #[serde(default = "default_medium")]
    pub medium: u32,
    #[serde(default = "default_large")]
    pub large: u32,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            thumbnail: default_thumbnail(),
            small: default_small(),
            medium: default_medium(),
            large: default_large(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        // Now perform the substitution (we know all vars exist)
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap() // Safe because we checked above
        });

        let config: Config = serde_yaml::from_str(&substituted).map_err(|e| e.to_string())?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.address.is_empty() {
            return Err("Server address cannot be empty".to_string());
        }

        if self.server.port == 0 {
            return Err("Server port cannot be 0".to_string());
        }

        if self.access.allowed_client_ips.is_empty() {
            return Err("At least one allowed client IP is required".to_string());
        }

        if self.access.allowed_source_origins.is_empty() {
            return Err("At least one allowed source origin is required".to_string());
        }

        for (name, size) in [
            ("thumbnail", self.presets.thumbnail),
            ("small", self.presets.small),
            ("medium", self.presets.medium),
            ("large", self.presets.large),
        ] {
            if size == 0 {
                return Err(format!("Preset '{}' must be greater than 0 pixels", name));
            }
        }

        Ok(())
    }
}
