//! catalog - 商品数据访问服务

pub mod api;
pub mod domain;
pub mod infrastructure;
