//! bootstrap - 服务启动骨架
//!
//! 加载配置、初始化日志与指标、装配基础设施并运行 HTTP 服务

mod health;
mod infrastructure;
mod runtime;
mod starter;

pub use health::*;
pub use infrastructure::*;
pub use runtime::*;
pub use starter::*;
