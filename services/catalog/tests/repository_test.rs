//! 商品仓储测试
//!
//! 用脚本化数据库回放结果流，校验物化、校验规则、资源释放和截止时间

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catalog::domain::entities::Product;
use catalog::domain::repositories::ProductRepository;
use catalog::infrastructure::persistence::SessionProductRepository;
use errors::{AppError, AppResult};
use mockall::mock;
use ports::testing::{Cell, CursorScript, ScriptedDatabase, ScriptedSet};
use ports::{AccessToken, ConnectionDescriptor, CredentialProvider, Param, Statement};

mock! {
    pub Credentials {}

    #[async_trait]
    impl CredentialProvider for Credentials {
        async fn acquire_token(&self) -> AppResult<AccessToken>;
    }
}

fn token_provider() -> MockCredentials {
    let mut credentials = MockCredentials::new();
    credentials
        .expect_acquire_token()
        .returning(|| Ok(AccessToken::new("iam-token")));
    credentials
}

fn repository(database: &ScriptedDatabase, deadline: Duration) -> SessionProductRepository {
    repository_with(database, token_provider(), deadline)
}

fn repository_with(
    database: &ScriptedDatabase,
    credentials: MockCredentials,
    deadline: Duration,
) -> SessionProductRepository {
    SessionProductRepository::new(
        ConnectionDescriptor::from("scripted://catalog"),
        Arc::new(credentials),
        Arc::new(database.clone()),
        deadline,
    )
}

const DEADLINE: Duration = Duration::from_secs(10);

// ============================================================================
// list_all
// ============================================================================

#[tokio::test]
async fn test_list_all_returns_rows_in_cursor_order() {
    let database = ScriptedDatabase::with_products(&[(1, 100, "a"), (2, 200, "b")]);
    let repo = repository(&database, DEADLINE);

    let products = repo.list_all().await.unwrap();

    assert_eq!(products, vec![Product::new(1, 100, "a"), Product::new(2, 200, "b")]);

    let ledger = database.ledger();
    assert_eq!(ledger.statements(), vec![Statement::select_all()]);
    assert_eq!(ledger.tokens(), vec!["iam-token".to_string()]);
    assert_eq!(ledger.sessions_closed(), 1);
    assert!(ledger.all_released());
}

#[tokio::test]
async fn test_list_all_concatenates_result_sets() {
    let database = ScriptedDatabase::new(
        CursorScript::new()
            .set(ScriptedSet::new().product(7, 70, "g"))
            .set(ScriptedSet::new())
            .set(ScriptedSet::new().product(3, 30, "c").product(5, 50, "e")),
    );
    let repo = repository(&database, DEADLINE);

    let ids: Vec<i64> = repo.list_all().await.unwrap().iter().map(|p| p.id).collect();

    assert_eq!(ids, vec![7, 3, 5]);
}

#[tokio::test]
async fn test_list_all_empty_table() {
    let database = ScriptedDatabase::new(CursorScript::new().set(ScriptedSet::new()));
    let repo = repository(&database, DEADLINE);

    let products = repo.list_all().await.unwrap();

    assert!(products.is_empty());
    assert!(database.ledger().all_released());
}

#[tokio::test]
async fn test_list_all_stream_fault_discards_partial_rows() {
    let database = ScriptedDatabase::new(
        CursorScript::new().set(
            ScriptedSet::new()
                .product(1, 100, "a")
                .fault("connection reset by peer"),
        ),
    );
    let repo = repository(&database, DEADLINE);

    let err = repo.list_all().await.unwrap_err();

    assert!(matches!(err, AppError::Cursor(_)));
    let ledger = database.ledger();
    assert_eq!(ledger.sessions_closed(), 1);
    assert!(ledger.all_released());
}

#[tokio::test]
async fn test_list_all_decode_failure() {
    let database = ScriptedDatabase::new(CursorScript::new().set(
        ScriptedSet::new().row(vec![Cell::Int(1), Cell::Null, Cell::Text("a".into())]),
    ));
    let repo = repository(&database, DEADLINE);

    let err = repo.list_all().await.unwrap_err();

    assert!(matches!(err, AppError::Decode(_)));
    assert!(database.ledger().all_released());
}

// ============================================================================
// find_by_id
// ============================================================================

#[tokio::test]
async fn test_find_by_id_hit() {
    let database = ScriptedDatabase::with_products(&[(5, 500, "five")]);
    let repo = repository(&database, DEADLINE);

    let product = repo.find_by_id(5).await.unwrap();

    assert_eq!(product, Product::new(5, 500, "five"));
    assert_eq!(database.ledger().statements(), vec![Statement::select_by_id(5)]);
}

#[tokio::test]
async fn test_find_by_id_miss_returns_absent() {
    let database = ScriptedDatabase::new(CursorScript::new().set(ScriptedSet::new()));
    let repo = repository(&database, DEADLINE);

    let product = repo.find_by_id(5).await.unwrap();

    assert!(product.is_absent());
    assert_eq!(product, Product::absent());
    assert!(database.ledger().all_released());
}

#[tokio::test]
async fn test_find_by_id_zero_is_rejected_before_any_io() {
    let database = ScriptedDatabase::with_products(&[(1, 100, "a")]);
    let mut credentials = MockCredentials::new();
    credentials.expect_acquire_token().never();
    let repo = repository_with(&database, credentials, DEADLINE);

    let err = repo.find_by_id(0).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(ref msg) if msg == "product id is invalid"));
    let ledger = database.ledger();
    assert_eq!(ledger.sessions_opened(), 0);
    assert!(ledger.statements().is_empty());
}

#[tokio::test]
async fn test_find_by_id_negative_id_is_queried() {
    let database = ScriptedDatabase::new(CursorScript::new().set(ScriptedSet::new()));
    let repo = repository(&database, DEADLINE);

    let product = repo.find_by_id(-3).await.unwrap();

    assert!(product.is_absent());
    assert_eq!(database.ledger().statements(), vec![Statement::select_by_id(-3)]);
}

#[tokio::test]
async fn test_find_by_id_stored_zero_id_is_invalid() {
    let database = ScriptedDatabase::with_products(&[(0, 100, "ghost")]);
    let repo = repository(&database, DEADLINE);

    let err = repo.find_by_id(9).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(ref msg) if msg == "invalid id from storage"));
    assert!(database.ledger().all_released());
}

#[tokio::test]
async fn test_find_by_id_binds_id_as_parameter() {
    let database = ScriptedDatabase::with_products(&[(42, 1, "x")]);
    let repo = repository(&database, DEADLINE);

    repo.find_by_id(42).await.unwrap();

    let statements = database.ledger().statements();
    assert_eq!(statements.len(), 1);
    assert!(!statements[0].sql().contains("42"));
    assert_eq!(statements[0].params(), &[Param::Int64(42)]);
}

// ============================================================================
// delete_by_id
// ============================================================================

#[tokio::test]
async fn test_delete_by_id_succeeds_without_rows() {
    let database = ScriptedDatabase::new(CursorScript::new().set(ScriptedSet::new()));
    let repo = repository(&database, DEADLINE);

    repo.delete_by_id(7).await.unwrap();

    let ledger = database.ledger();
    assert_eq!(ledger.statements(), vec![Statement::delete_by_id(7)]);
    assert_eq!(ledger.statements()[0].params(), &[Param::Int64(7)]);
    assert!(ledger.all_released());
}

#[tokio::test]
async fn test_delete_by_id_missing_row_is_still_success() {
    let database = ScriptedDatabase::new(CursorScript::new());
    let repo = repository(&database, DEADLINE);

    assert!(repo.delete_by_id(12345).await.is_ok());
}

#[tokio::test]
async fn test_delete_by_id_query_failure() {
    let database = ScriptedDatabase::new(CursorScript::new())
        .fail_execute(|| AppError::query("permission denied for table products"));
    let repo = repository(&database, DEADLINE);

    let err = repo.delete_by_id(7).await.unwrap_err();

    assert!(matches!(err, AppError::Query(_)));
    let ledger = database.ledger();
    assert_eq!(ledger.cursors_opened(), 0);
    assert_eq!(ledger.sessions_closed(), 1);
    assert!(ledger.all_released());
}

// ============================================================================
// 凭证与连接
// ============================================================================

#[tokio::test]
async fn test_credential_failure_opens_no_session() {
    let database = ScriptedDatabase::with_products(&[(1, 100, "a")]);
    let mut credentials = MockCredentials::new();
    credentials
        .expect_acquire_token()
        .times(1)
        .returning(|| Err(AppError::credential("metadata service unavailable")));
    let repo = repository_with(&database, credentials, DEADLINE);

    let err = repo.list_all().await.unwrap_err();

    assert!(matches!(err, AppError::Credential(_)));
    assert_eq!(database.ledger().sessions_opened(), 0);
}

#[tokio::test]
async fn test_connect_failure_is_connectivity_error() {
    let database = ScriptedDatabase::with_products(&[(1, 100, "a")])
        .fail_connect(|| AppError::connectivity("connection refused"));
    let repo = repository(&database, DEADLINE);

    let err = repo.find_by_id(1).await.unwrap_err();

    assert!(matches!(err, AppError::Connectivity(_)));
    let ledger = database.ledger();
    assert!(ledger.statements().is_empty());
    assert!(ledger.all_released());
}

#[tokio::test]
async fn test_each_operation_uses_fresh_token_and_session() {
    let database = ScriptedDatabase::with_products(&[(1, 100, "a")]);
    let repo = repository(&database, DEADLINE);

    repo.list_all().await.unwrap();
    repo.find_by_id(1).await.unwrap();
    repo.delete_by_id(1).await.unwrap();

    let ledger = database.ledger();
    assert_eq!(ledger.tokens().len(), 3);
    assert_eq!(ledger.sessions_opened(), 3);
    assert_eq!(ledger.sessions_closed(), 3);
    assert!(ledger.all_released());
}

// ============================================================================
// 截止时间
// ============================================================================

#[tokio::test]
async fn test_deadline_exceeded_is_timeout_and_releases_resources() {
    let database = ScriptedDatabase::with_products(&[(1, 100, "a"), (2, 200, "b")])
        .with_delay(Duration::from_millis(200));
    let repo = repository(&database, Duration::from_millis(50));

    let err = repo.list_all().await.unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
    let ledger = database.ledger();
    assert_eq!(ledger.sessions_opened(), 1);
    assert_eq!(ledger.cursors_opened(), 1);
    assert!(ledger.all_released());
}

#[tokio::test]
async fn test_slow_but_within_deadline_succeeds() {
    let database = ScriptedDatabase::with_products(&[(1, 100, "a")])
        .with_delay(Duration::from_millis(5));
    let repo = repository(&database, Duration::from_secs(5));

    let products = repo.list_all().await.unwrap();

    assert_eq!(products.len(), 1);
}
