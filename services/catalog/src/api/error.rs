//! 错误到 HTTP 响应的映射

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use errors::{AppError, ErrorBody};

/// 接口层错误
#[derive(Debug)]
pub enum ApiError {
    /// 请求体无法读取
    Body,
    /// 请求体无法解码
    Payload,
    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl ApiError {
    /// 对外暴露的固定文案，不泄露内部细节
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Body => "cannot get request body",
            Self::Payload => "cannot unmarshal request body",
            Self::App(err) => match err {
                AppError::Credential(_) => "failed to get token",
                AppError::Configuration(_) => "service misconfigured",
                AppError::Connectivity(_) => "failed to connect to database",
                AppError::Query(_) => "failed to query products",
                AppError::Cursor(_) => "failed to fetch products",
                AppError::Decode(_) => "failed to scan products",
                AppError::Validation(_) => "product id is invalid",
                AppError::Timeout(_) => "operation timed out",
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Body | Self::Payload => StatusCode::INTERNAL_SERVER_ERROR,
            Self::App(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.public_message()))).into_response()
    }
}
