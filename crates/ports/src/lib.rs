//! ports - 抽象 trait 层
//!
//! 定义凭证、会话、语句与结果游标的抽象接口

mod credential;
mod cursor;
mod session;
mod statement;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use credential::*;
pub use cursor::*;
pub use session::*;
pub use statement::*;
