//! PostgreSQL 会话配置模块
//!
//! 连接串来自已校验的 [`ConnectionDescriptor`]，访问令牌作为密码提交

use std::str::FromStr;

use errors::{AppError, AppResult};
use ports::{AccessToken, ConnectionDescriptor};
use sqlx::postgres::PgConnectOptions;

/// PostgreSQL 会话配置
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// 应用名称（用于连接标识）
    pub application_name: Option<String>,
    /// 语句缓存大小
    pub statement_cache_capacity: usize,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            application_name: None,
            statement_cache_capacity: 100,
        }
    }
}

impl PostgresConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置应用名称
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// 设置语句缓存大小
    pub fn with_statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }

    /// 解析连接串，不附带凭证
    pub fn parse_descriptor(descriptor: &ConnectionDescriptor) -> AppResult<PgConnectOptions> {
        PgConnectOptions::from_str(descriptor.expose())
            .map_err(|e| AppError::configuration(format!("Invalid database descriptor: {}", e)))
    }

    /// 构建带访问令牌的连接选项
    pub fn connect_options(
        &self,
        descriptor: &ConnectionDescriptor,
        token: &AccessToken,
    ) -> AppResult<PgConnectOptions> {
        let mut options = Self::parse_descriptor(descriptor)?
            .password(token.expose())
            .statement_cache_capacity(self.statement_cache_capacity);

        if let Some(ref app_name) = self.application_name {
            options = options.application_name(app_name);
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PostgresConfig::default();
        assert_eq!(config.statement_cache_capacity, 100);
        assert!(config.application_name.is_none());
    }

    #[test]
    fn test_connect_options_from_descriptor() {
        let config = PostgresConfig::new()
            .with_application_name("catalog")
            .with_statement_cache_capacity(20);
        let descriptor = ConnectionDescriptor::from("postgres://svc@db.internal:6432/catalog");

        let options = config
            .connect_options(&descriptor, &AccessToken::new("t1.token"))
            .unwrap();

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6432);
        assert_eq!(options.get_username(), "svc");
        assert_eq!(options.get_database(), Some("catalog"));
        assert_eq!(options.get_application_name(), Some("catalog"));
    }

    #[test]
    fn test_malformed_descriptor_is_configuration_error() {
        let descriptor = ConnectionDescriptor::from("postgres://db:notaport/catalog");
        let err = PostgresConfig::parse_descriptor(&descriptor).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
