//! config - 配置加载库

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 连接串的存储形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlEncoding {
    #[default]
    Plain,
    /// 标准字母表 base64
    Base64,
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default)]
    pub url_encoding: UrlEncoding,
    #[serde(default)]
    pub application_name: Option<String>,
    #[serde(default = "default_statement_cache_capacity")]
    pub statement_cache_capacity: usize,
}

fn default_statement_cache_capacity() -> usize {
    100
}

impl DatabaseConfig {
    /// 解析出可直接连接的连接串
    pub fn connection_descriptor(&self) -> Result<Secret<String>, ConfigError> {
        let raw = self.url.expose_secret().trim();
        if raw.is_empty() {
            return Err(ConfigError::Invalid("database.url is not set".to_string()));
        }

        let descriptor = match self.url_encoding {
            UrlEncoding::Plain => raw.to_string(),
            UrlEncoding::Base64 => {
                let bytes = STANDARD.decode(raw).map_err(|e| {
                    ConfigError::Invalid(format!("database.url is not valid base64: {}", e))
                })?;
                String::from_utf8(bytes).map_err(|_| {
                    ConfigError::Invalid("decoded database.url is not valid UTF-8".to_string())
                })?
            }
        };

        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(ConfigError::Invalid("decoded database.url is empty".to_string()));
        }

        Ok(Secret::new(descriptor.to_string()))
    }
}

/// 访问令牌来源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// 实例元数据服务签发的短期令牌
    #[default]
    Metadata,
    /// 配置中固定的令牌（本地开发）
    Static,
}

/// 凭证配置
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub source: CredentialSource,
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
    #[serde(default)]
    pub token: Option<Secret<String>>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_metadata_url() -> String {
    "http://169.254.169.254/computeMetadata/v1/instance/service-accounts/default/token"
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            source: CredentialSource::default(),
            metadata_url: default_metadata_url(),
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CredentialsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 单次操作配置
#[derive(Debug, Clone, Deserialize)]
pub struct OperationConfig {
    /// 覆盖取令牌、连接、查询和读取结果的总时限
    #[serde(default = "default_operation_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_operation_timeout_secs() -> u64 {
    10
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_operation_timeout_secs(),
        }
    }
}

impl OperationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub operation: OperationConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("CATALOG_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
