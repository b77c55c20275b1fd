//! errors - 统一错误处理
//!
//! 数据访问层的错误分类，以及对外的 `{"error": ...}` 响应体

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 无法获取有效的访问令牌
    #[error("Credential error: {0}")]
    Credential(String),

    /// 连接串缺失或格式错误
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 无法建立或保持数据库会话
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// 数据库拒绝或执行语句失败
    #[error("Query error: {0}")]
    Query(String),

    /// 读取结果流失败（非流结束信号）
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// 行结构与实体字段不匹配
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// 超出操作截止时间
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl AppError {
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn cursor(msg: impl Into<String>) -> Self {
        Self::Cursor(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// 稳定的类别标签，用于日志和 metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Credential(_) => "credential",
            Self::Configuration(_) => "configuration",
            Self::Connectivity(_) => "connectivity",
            Self::Query(_) => "query",
            Self::Cursor(_) => "cursor",
            Self::Decode(_) => "decode",
            Self::Validation(_) => "validation",
            Self::Timeout(_) => "timeout",
        }
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Timeout(_) => 504,
            Self::Credential(_)
            | Self::Configuration(_)
            | Self::Connectivity(_)
            | Self::Query(_)
            | Self::Cursor(_)
            | Self::Decode(_) => 500,
        }
    }
}

/// 错误响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
