//! 基础设施资源管理
//!
//! 启动时一次性校验配置并装配连接串、凭证提供者和会话提供者

use std::sync::Arc;
use std::time::Duration;

use adapter_iam::{MetadataTokenProvider, StaticTokenProvider};
use adapter_postgres::{PgProvisioner, PostgresConfig};
use config::{AppConfig, CredentialSource};
use errors::{AppError, AppResult};
use ports::{ConnectionDescriptor, ConnectionProvisioner, CredentialProvider};
use tracing::info;

/// 基础设施资源容器
///
/// 每个操作按需建立会话，这里不持有连接
#[derive(Clone)]
pub struct Infrastructure {
    descriptor: ConnectionDescriptor,
    credentials: Arc<dyn CredentialProvider>,
    provisioner: Arc<dyn ConnectionProvisioner>,
    operation_timeout: Duration,
}

impl Infrastructure {
    /// 从配置创建基础设施资源
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        // 1. 连接串：解码并校验格式
        let descriptor = config
            .database
            .connection_descriptor()
            .map(ConnectionDescriptor::new)
            .map_err(|e| AppError::configuration(e.to_string()))?;
        PgProvisioner::check_descriptor(&descriptor)?;

        // 2. 凭证提供者
        let credentials = build_credentials(config)?;

        // 3. 会话提供者
        let mut pg_config = PostgresConfig::new()
            .with_statement_cache_capacity(config.database.statement_cache_capacity);
        if let Some(name) = &config.database.application_name {
            pg_config = pg_config.with_application_name(name);
        }
        let provisioner: Arc<dyn ConnectionProvisioner> = Arc::new(PgProvisioner::new(pg_config));

        let operation_timeout = config.operation.timeout();
        if operation_timeout.is_zero() {
            return Err(AppError::configuration("operation.timeout_secs must be positive"));
        }

        info!(
            credential_source = ?config.credentials.source,
            operation_timeout = ?operation_timeout,
            "Infrastructure initialized"
        );

        Ok(Self {
            descriptor,
            credentials,
            provisioner,
            operation_timeout,
        })
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        self.credentials.clone()
    }

    pub fn provisioner(&self) -> Arc<dyn ConnectionProvisioner> {
        self.provisioner.clone()
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }
}

fn build_credentials(config: &AppConfig) -> AppResult<Arc<dyn CredentialProvider>> {
    let credentials = &config.credentials;
    match credentials.source {
        CredentialSource::Metadata => Ok(Arc::new(MetadataTokenProvider::new(
            credentials.metadata_url.clone(),
            credentials.request_timeout(),
        )?)),
        CredentialSource::Static => {
            let token = credentials.token.clone().ok_or_else(|| {
                AppError::configuration("credentials.token is required for static source")
            })?;
            Ok(Arc::new(StaticTokenProvider::new(token)))
        }
    }
}
