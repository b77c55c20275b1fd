//! 请求与响应结构
//!
//! 字段名沿用 `Id`/`CreatedAt`/`Name`，同时接受小驼峰写法

use serde::{Deserialize, Serialize};

use crate::domain::entities::Product;

/// 商品 JSON 表示，缺失字段取零值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProductDto {
    #[serde(alias = "id")]
    pub id: i64,
    #[serde(alias = "createdAt", alias = "created_at")]
    pub created_at: i64,
    #[serde(alias = "name")]
    pub name: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            created_at: product.created_at,
            name: product.name,
        }
    }
}

/// 删除成功的响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse {
    pub data: String,
}

impl DataResponse {
    pub fn product() -> Self {
        Self {
            data: "product".to_string(),
        }
    }
}
