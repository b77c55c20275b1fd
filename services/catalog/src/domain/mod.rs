//! 领域层

pub mod entities;
pub mod repositories;

pub use entities::*;
pub use repositories::*;
