//! 结果物化
//!
//! 把两层游标（结果集 → 行）按顺序读成 `Product` 列表。
//! 结果集或行的 `None` 是正常结束；`StreamFault` 和解码失败都会中止整个读取，
//! 已读到的行一并丢弃。

use errors::{AppError, AppResult};
use ports::{ColumnError, Cursor, Row};
use tracing::error;

use crate::domain::entities::Product;

/// 按位置解码：0 → id，1 → createdAt，2 → name
pub fn decode_product(row: &dyn Row) -> Result<Product, ColumnError> {
    Ok(Product {
        id: row.get_i64(0)?,
        created_at: row.get_i64(1)?,
        name: row.get_text(2)?,
    })
}

/// 读完整个游标
pub async fn drain(cursor: &mut dyn Cursor) -> AppResult<Vec<Product>> {
    collect(cursor, usize::MAX).await
}

/// 最多读取一行，其余结果不再请求
///
/// 空结果集不算未命中：会继续读下一个结果集，整个游标结束才返回 `None`
pub async fn drain_first(cursor: &mut dyn Cursor) -> AppResult<Option<Product>> {
    Ok(collect(cursor, 1).await?.into_iter().next())
}

async fn collect(cursor: &mut dyn Cursor, limit: usize) -> AppResult<Vec<Product>> {
    let mut products = Vec::new();

    'sets: while products.len() < limit {
        let mut set = match cursor.next_result_set().await {
            Ok(Some(set)) => set,
            Ok(None) => break,
            Err(fault) => {
                error!(error = %fault, "failed to fetch set of products");
                return Err(AppError::cursor(format!(
                    "failed to fetch set of products: {}",
                    fault
                )));
            }
        };

        while products.len() < limit {
            let row = match set.next_row().await {
                Ok(Some(row)) => row,
                Ok(None) => continue 'sets,
                Err(fault) => {
                    error!(error = %fault, "failed to fetch row of products");
                    return Err(AppError::cursor(format!(
                        "failed to fetch row of products: {}",
                        fault
                    )));
                }
            };

            let product = decode_product(row.as_ref()).map_err(|e| {
                error!(error = %e, "failed to scan products");
                AppError::decode(format!("failed to scan products: {}", e))
            })?;
            products.push(product);
        }
    }

    Ok(products)
}
