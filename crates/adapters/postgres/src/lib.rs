//! adapter-postgres - PostgreSQL 适配器
//!
//! 会话建立、语句执行与嵌套结果游标

mod config;
mod connection;
mod error;
mod session;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use session::*;
