//! 结果游标 trait 定义
//!
//! 游标是两层的惰性序列：外层是结果集，内层是行。
//! `Ok(None)` 表示对应层级已经读完，`Err` 只表示真正的读取失败。

use async_trait::async_trait;
use thiserror::Error;

/// 读取结果集或行时的失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StreamFault(pub String);

impl StreamFault {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// 按位置读取列时的失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("column {index} out of range for row of {len} columns")]
    OutOfRange { index: usize, len: usize },

    #[error("column {index} is null")]
    Null { index: usize },

    #[error("column {index}: {message}")]
    Mismatch { index: usize, message: String },
}

/// 只进、不可重置的结果游标
#[async_trait]
pub trait Cursor: Send {
    /// 推进到下一个结果集；当前结果集未读完的行会被跳过
    async fn next_result_set(&mut self) -> Result<Option<Box<dyn ResultSet + '_>>, StreamFault>;
}

/// 游标中的一个结果集
#[async_trait]
pub trait ResultSet: Send {
    async fn next_row(&mut self) -> Result<Option<Box<dyn Row>>, StreamFault>;
}

/// 按位置访问的行
pub trait Row: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_i64(&self, index: usize) -> Result<i64, ColumnError>;

    fn get_text(&self, index: usize) -> Result<String, ColumnError>;
}
