use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gigachat: GigaChatConfig,
    pub store: StoreConfig,
    pub gateway: GatewayConfig,
    pub extract: ExtractConfig,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct GigaChatConfig {
    pub credentials: String,
    pub scope: String,
    pub base_url: String,
    pub auth_url: String,
    pub model: String,
}

// Credentials never appear in debug output.
impl std::fmt::Debug for GigaChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GigaChatConfig")
            .field("scope", &self.scope)
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub max_file_size: usize,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error when required settings are missing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.gigachat.credentials.is_empty() {
            anyhow::bail!(
                "GigaChat credentials are not set; provide gigachat.credentials in pravo.toml \
                 or the PRAVO_GIGACHAT_CREDENTIALS env var"
            );
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PRAVO_GIGACHAT_CREDENTIALS") {
            self.gigachat.credentials = v;
        }
        if let Ok(v) = std::env::var("PRAVO_GIGACHAT_SCOPE") {
            self.gigachat.scope = v;
        }
        if let Ok(v) = std::env::var("PRAVO_GIGACHAT_BASE_URL") {
            self.gigachat.base_url = v;
        }
        if let Ok(v) = std::env::var("PRAVO_GIGACHAT_AUTH_URL") {
            self.gigachat.auth_url = v;
        }
        if let Ok(v) = std::env::var("PRAVO_GIGACHAT_MODEL") {
            self.gigachat.model = v;
        }
        if let Ok(v) = std::env::var("PRAVO_STORE_PATH") {
            self.store.path = v;
        }
        if let Ok(v) = std::env::var("PRAVO_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("PRAVO_GATEWAY_PORT")
            && let Ok(port) = v.parse()
        {
            self.gateway.port = port;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gigachat: GigaChatConfig::default(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            extract: ExtractConfig::default(),
        }
    }
}

impl Default for GigaChatConfig {
    fn default() -> Self {
        Self {
            credentials: String::new(),
            scope: pravo_gigachat::client::DEFAULT_SCOPE.to_owned(),
            base_url: pravo_gigachat::client::DEFAULT_BASE_URL.to_owned(),
            auth_url: pravo_gigachat::client::DEFAULT_AUTH_URL.to_owned(),
            model: pravo_gigachat::client::DEFAULT_MODEL.to_owned(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "./data/pravo.db".into(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
            max_body_size: 52_428_800,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_file_size: pravo_extract::DEFAULT_MAX_FILE_SIZE,
        }
    }
}
