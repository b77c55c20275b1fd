//! PostgreSQL 会话建立

use std::time::Duration;

use async_trait::async_trait;
use errors::{AppError, AppResult};
use ports::{AccessToken, ConnectionDescriptor, ConnectionProvisioner, Session};
use sqlx::{Connection, PgConnection};
use tracing::{debug, info};

use crate::config::PostgresConfig;
use crate::error::map_connect_error;
use crate::session::PgSession;

/// 每次调用建立一条独立连接，不使用连接池
#[derive(Debug, Clone, Default)]
pub struct PgProvisioner {
    config: PostgresConfig,
}

impl PgProvisioner {
    pub fn new(config: PostgresConfig) -> Self {
        Self { config }
    }

    /// 启动时校验连接串
    pub fn check_descriptor(descriptor: &ConnectionDescriptor) -> AppResult<()> {
        PostgresConfig::parse_descriptor(descriptor).map(|_| ())
    }
}

#[async_trait]
impl ConnectionProvisioner for PgProvisioner {
    async fn open_session(
        &self,
        descriptor: &ConnectionDescriptor,
        token: &AccessToken,
        timeout: Duration,
    ) -> AppResult<Box<dyn Session>> {
        if token.is_expired() {
            return Err(AppError::credential("Access token expired before connect"));
        }

        let options = self.config.connect_options(descriptor, token)?;

        debug!(?timeout, "Opening database session");
        let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| {
                AppError::connectivity(format!(
                    "Database handshake did not complete within {:?}",
                    timeout
                ))
            })?
            .map_err(map_connect_error)?;

        info!("Database session opened");
        Ok(Box::new(PgSession::new(conn)))
    }
}
