//! 商品实体

use errors::{AppError, AppResult};

/// 商品
///
/// `id == 0` 的值不是持久化实体，表示“不存在”
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub created_at: i64,
    pub name: String,
}

impl Product {
    pub fn new(id: i64, created_at: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            created_at,
            name: name.into(),
        }
    }

    /// 单项查询未命中时返回的零值
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.id == 0
    }

    /// 显式的存在/不存在视图
    pub fn into_option(self) -> Option<Self> {
        if self.is_absent() { None } else { Some(self) }
    }
}

/// 校验调用方传入的商品 ID
pub fn ensure_product_id(id: i64) -> AppResult<i64> {
    if id == 0 {
        return Err(AppError::validation("product id is invalid"));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_zero_value() {
        let absent = Product::absent();
        assert_eq!(absent, Product::new(0, 0, ""));
        assert!(absent.is_absent());
        assert_eq!(absent.into_option(), None);
    }

    #[test]
    fn test_present_into_option() {
        let product = Product::new(7, 1_700_000_000, "lamp");
        assert!(!product.is_absent());
        assert_eq!(product.clone().into_option(), Some(product));
    }

    #[test]
    fn test_ensure_product_id() {
        assert!(matches!(ensure_product_id(0), Err(AppError::Validation(_))));
        assert_eq!(ensure_product_id(-3).unwrap(), -3);
        assert_eq!(ensure_product_id(42).unwrap(), 42);
    }
}
