//! PostgreSQL 会话集成测试
//!
//! 需要可用的数据库：DATABASE_URL 指向目标库，DATABASE_PASSWORD 作为访问令牌

use std::env;
use std::time::Duration;

use adapter_postgres::{PgProvisioner, PostgresConfig};
use errors::AppError;
use ports::{AccessToken, ConnectionDescriptor, ConnectionProvisioner, Session, Statement};
use sqlx::{Connection, PgConnection};

fn descriptor() -> ConnectionDescriptor {
    let url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost:5432/catalog".to_string());
    ConnectionDescriptor::from(url.as_str())
}

fn token() -> AccessToken {
    AccessToken::new(env::var("DATABASE_PASSWORD").unwrap_or_else(|_| "postgres".to_string()))
}

async fn open() -> Box<dyn Session> {
    PgProvisioner::new(PostgresConfig::new().with_application_name("catalog-tests"))
        .open_session(&descriptor(), &token(), Duration::from_secs(5))
        .await
        .expect("Failed to connect to database")
}

async fn seed() {
    // 建表不属于仓储职责，这里只为测试准备数据
    let options = PostgresConfig::new()
        .connect_options(&descriptor(), &token())
        .unwrap();
    let mut conn = PgConnection::connect_with(&options)
        .await
        .expect("Failed to connect to database");

    for sql in [
        "DROP TABLE IF EXISTS products",
        r#"CREATE TABLE products (id BIGINT PRIMARY KEY, "createdAt" BIGINT NOT NULL, name TEXT NOT NULL)"#,
        r#"INSERT INTO products (id, "createdAt", name) VALUES (1, 100, 'a'), (2, 200, 'b')"#,
    ] {
        sqlx::query(sql).execute(&mut conn).await.expect("Failed to seed products");
    }
    conn.close().await.ok();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_select_all_streams_rows_in_order() {
    seed().await;
    let mut session = open().await;

    let mut ids = Vec::new();
    {
        let mut cursor = session.execute(&Statement::select_all()).await.unwrap();
        while let Some(mut set) = cursor.next_result_set().await.unwrap() {
            while let Some(row) = set.next_row().await.unwrap() {
                ids.push(row.get_i64(0).unwrap());
            }
        }
    }
    session.close().await.unwrap();

    // 新建表按插入顺序扫描
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_delete_yields_single_empty_set() {
    let mut session = open().await;
    let mut cursor = session.execute(&Statement::delete_by_id(987_654)).await.unwrap();

    let mut set = cursor.next_result_set().await.unwrap().expect("completion set");
    assert!(set.next_row().await.unwrap().is_none());
    drop(set);
    assert!(cursor.next_result_set().await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_wrong_token_is_credential_error() {
    let result = PgProvisioner::default()
        .open_session(
            &descriptor(),
            &AccessToken::new("definitely-not-the-password"),
            Duration::from_secs(5),
        )
        .await;

    assert!(matches!(result, Err(AppError::Credential(_))));
}
