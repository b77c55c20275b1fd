//! Session trait 定义

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use errors::AppResult;
use secrecy::{ExposeSecret, Secret};

use crate::credential::AccessToken;
use crate::cursor::Cursor;
use crate::statement::Statement;

/// 已校验的数据库连接串
#[derive(Clone)]
pub struct ConnectionDescriptor(Secret<String>);

impl ConnectionDescriptor {
    pub fn new(descriptor: Secret<String>) -> Self {
        Self(descriptor)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<&str> for ConnectionDescriptor {
    fn from(value: &str) -> Self {
        Self(Secret::new(value.to_string()))
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConnectionDescriptor([REDACTED])")
    }
}

/// 建立数据库会话
///
/// 每次调用返回一个独立的会话，由调用方负责关闭
#[async_trait]
pub trait ConnectionProvisioner: Send + Sync {
    /// 失败时返回 `Credential`、`Configuration` 或 `Connectivity`
    async fn open_session(
        &self,
        descriptor: &ConnectionDescriptor,
        token: &AccessToken,
        timeout: Duration,
    ) -> AppResult<Box<dyn Session>>;
}

/// 单次操作独占的数据库会话
///
/// 未调用 `close` 就被 drop 时，实现必须释放底层连接
#[async_trait]
pub trait Session: Send {
    /// 执行语句并返回位于第一个结果集之前的游标
    ///
    /// 游标借用会话，因此总是先于会话被释放
    async fn execute(&mut self, statement: &Statement) -> AppResult<Box<dyn Cursor + '_>>;

    /// 有序关闭会话；重复调用为空操作
    async fn close(&mut self) -> AppResult<()>;
}
