//! catalog 服务入口

use std::sync::Arc;

use catalog::api;
use catalog::infrastructure::persistence::SessionProductRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    bootstrap::run_http("config", |infra| {
        let repository = SessionProductRepository::new(
            infra.descriptor().clone(),
            infra.credentials(),
            infra.provisioner(),
            infra.operation_timeout(),
        );
        api::routes(Arc::new(repository))
    })
    .await
}
