//! 参数化语句

/// 绑定参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Int64(i64),
}

/// 语句文本固定，id 只作为参数绑定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: &'static str,
    params: Vec<Param>,
}

impl Statement {
    pub const SELECT_ALL: &'static str = r#"SELECT id, "createdAt", name FROM products"#;
    pub const SELECT_BY_ID: &'static str =
        r#"SELECT id, "createdAt", name FROM products WHERE id = $1"#;
    pub const DELETE_BY_ID: &'static str = "DELETE FROM products WHERE id = $1";

    pub fn select_all() -> Self {
        Self {
            sql: Self::SELECT_ALL,
            params: Vec::new(),
        }
    }

    pub fn select_by_id(id: i64) -> Self {
        Self {
            sql: Self::SELECT_BY_ID,
            params: vec![Param::Int64(id)],
        }
    }

    pub fn delete_by_id(id: i64) -> Self {
        Self {
            sql: Self::DELETE_BY_ID,
            params: vec![Param::Int64(id)],
        }
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}
