//! 商品接口

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::error;

use super::dto::{DataResponse, ProductDto};
use super::error::ApiError;
use crate::domain::repositories::ProductRepository;

#[derive(Clone)]
struct AppState {
    repository: Arc<dyn ProductRepository>,
}

pub fn routes(repository: Arc<dyn ProductRepository>) -> Router {
    Router::new()
        .route("/products", get(list_products).delete(delete_product))
        .route("/products/lookup", post(get_product))
        .with_state(AppState { repository })
}

fn decode_payload(body: Result<Bytes, BytesRejection>) -> Result<ProductDto, ApiError> {
    let body = body.map_err(|e| {
        error!(error = %e, "cannot get request body");
        ApiError::Body
    })?;
    serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "cannot unmarshal request body");
        ApiError::Payload
    })
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.repository.list_all().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

async fn get_product(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ProductDto>, ApiError> {
    let input = decode_payload(body)?;
    let product = state.repository.find_by_id(input.id).await?;
    Ok(Json(product.into()))
}

async fn delete_product(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DataResponse>, ApiError> {
    let input = decode_payload(body)?;
    state.repository.delete_by_id(input.id).await?;
    Ok(Json(DataResponse::product()))
}
