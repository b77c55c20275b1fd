//! 商品仓储接口

use async_trait::async_trait;
use errors::AppResult;

use crate::domain::entities::Product;

/// 商品仓储接口
///
/// 每个操作独占一个会话，执行一条语句，返回前释放会话
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 按游标顺序返回全部商品；空表返回空列表
    async fn list_all(&self) -> AppResult<Vec<Product>>;

    /// 未命中时返回 [`Product::absent`]
    async fn find_by_id(&self, id: i64) -> AppResult<Product>;

    /// 不检查行是否存在，语句执行成功即视为成功
    async fn delete_by_id(&self, id: i64) -> AppResult<()>;
}
