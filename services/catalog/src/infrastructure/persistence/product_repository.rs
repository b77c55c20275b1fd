//! 基于会话的商品仓储实现
//!
//! 每个操作：取令牌 → 建立会话 → 执行一条语句 → 物化结果 → 关闭会话，
//! 整体受同一个截止时间约束。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use errors::{AppError, AppResult};
use ports::{ConnectionDescriptor, ConnectionProvisioner, CredentialProvider, Session, Statement};
use tokio::time::Instant;
use tracing::{debug, error, instrument, warn};

use super::materializer;
use crate::domain::entities::{Product, ensure_product_id};
use crate::domain::repositories::ProductRepository;

/// 游标的消费方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Consume {
    All,
    First,
    /// 只要求语句执行成功
    Nothing,
}

pub struct SessionProductRepository {
    descriptor: ConnectionDescriptor,
    credentials: Arc<dyn CredentialProvider>,
    provisioner: Arc<dyn ConnectionProvisioner>,
    deadline: Duration,
}

impl SessionProductRepository {
    pub fn new(
        descriptor: ConnectionDescriptor,
        credentials: Arc<dyn CredentialProvider>,
        provisioner: Arc<dyn ConnectionProvisioner>,
        deadline: Duration,
    ) -> Self {
        Self {
            descriptor,
            credentials,
            provisioner,
            deadline,
        }
    }

    /// 在截止时间内执行一次操作并记录指标
    async fn run(
        &self,
        operation: &'static str,
        statement: Statement,
        consume: Consume,
    ) -> AppResult<Vec<Product>> {
        let started = Instant::now();
        let deadline = started + self.deadline;

        // 超时后内部 future 被 drop，会话和游标随之释放
        let attempt = self.execute(&statement, consume, deadline);
        let outcome = match tokio::time::timeout_at(deadline, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(deadline = ?self.deadline, "operation exceeded deadline");
                Err(AppError::timeout(format!(
                    "{} did not complete within {:?}",
                    operation, self.deadline
                )))
            }
        };

        let label = match &outcome {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        telemetry::record_repository_operation(operation, label, started.elapsed());

        outcome
    }

    async fn execute(
        &self,
        statement: &Statement,
        consume: Consume,
        deadline: Instant,
    ) -> AppResult<Vec<Product>> {
        let token = self.credentials.acquire_token().await.inspect_err(|e| {
            error!(error = %e, "failed to get token");
        })?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let mut session = self
            .provisioner
            .open_session(&self.descriptor, &token, remaining)
            .await
            .inspect_err(|e| error!(error = %e, "failed to connect to database"))?;

        let outcome = query(session.as_mut(), statement, consume).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close database session");
        }

        outcome
    }
}

/// 游标借用会话，函数返回时游标已释放
async fn query(
    session: &mut dyn Session,
    statement: &Statement,
    consume: Consume,
) -> AppResult<Vec<Product>> {
    let mut cursor = session
        .execute(statement)
        .await
        .inspect_err(|e| error!(error = %e, "failed to query products"))?;

    match consume {
        Consume::All => materializer::drain(cursor.as_mut()).await,
        Consume::First => Ok(materializer::drain_first(cursor.as_mut())
            .await?
            .into_iter()
            .collect()),
        Consume::Nothing => Ok(Vec::new()),
    }
}

#[async_trait]
impl ProductRepository for SessionProductRepository {
    #[instrument(skip(self), fields(operation = "list_all"))]
    async fn list_all(&self) -> AppResult<Vec<Product>> {
        let products = self
            .run("list_all", Statement::select_all(), Consume::All)
            .await?;
        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    #[instrument(skip(self), fields(operation = "find_by_id"))]
    async fn find_by_id(&self, id: i64) -> AppResult<Product> {
        let id = ensure_product_id(id).inspect_err(|_| {
            error!("received product id is invalid");
        })?;

        let product = self
            .run("find_by_id", Statement::select_by_id(id), Consume::First)
            .await?
            .into_iter()
            .next();

        match product {
            None => {
                debug!("product not found");
                Ok(Product::absent())
            }
            Some(product) if product.is_absent() => {
                error!("received from database product id is invalid");
                Err(AppError::validation("invalid id from storage"))
            }
            Some(product) => Ok(product),
        }
    }

    #[instrument(skip(self), fields(operation = "delete_by_id"))]
    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        self.run("delete_by_id", Statement::delete_by_id(id), Consume::Nothing)
            .await?;
        debug!("delete statement executed");
        Ok(())
    }
}
