//! HTTP 请求适配层
//!
//! 解码请求体，调用一次仓储操作，把结果或错误写成 JSON 响应

mod dto;
mod error;
mod handlers;

pub use dto::*;
pub use error::ApiError;
pub use handlers::routes;
