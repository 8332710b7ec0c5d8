use crate::application::{CreatePaymentRequest, ErrorResponse, PaymentService};
use crate::domain::errors::DomainError;
use crate::ports::BufPayPort;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{error, info};

/// 应用状态
pub struct AppState<T: BufPayPort> {
    pub payment_service: Arc<PaymentService<T>>,
}

impl<T: BufPayPort> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            payment_service: self.payment_service.clone(),
        }
    }
}

fn error_response(code: &str, e: DomainError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        DomainError::ValidationError(_) => StatusCode::BAD_REQUEST,
        e if e.is_gateway_error() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(code.to_string(), e.to_string())))
}

/// 创建支付订单
pub async fn create_payment<T: BufPayPort + 'static>(
    State(state): State<AppState<T>>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    info!("Received payment creation request: {:?}", request.order_id);

    state
        .payment_service
        .create_payment(request)
        .await
        .map(|details| (StatusCode::CREATED, Json(details)))
        .map_err(|e| {
            error!("Payment creation error: {}", e);
            error_response("PAYMENT_ERROR", e)
        })
}

/// 查询订单
pub async fn query_payment<T: BufPayPort + 'static>(
    State(state): State<AppState<T>>,
    Path(aoid): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    state
        .payment_service
        .query_payment(&aoid)
        .await
        .map(|status| (StatusCode::OK, Json(status)))
        .map_err(|e| {
            error!("Payment query error: {}", e);
            error_response("QUERY_ERROR", e)
        })
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
