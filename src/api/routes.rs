use super::handlers::*;
use super::webhook::{notify_router, NotifyCallback};
use crate::ports::BufPayPort;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建完整的服务路由：支付接口 + BufPay 通知
pub fn create_router<T: BufPayPort + 'static>(
    state: AppState<T>,
    client: Arc<T>,
    callback: Option<NotifyCallback>,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/payments", post(create_payment::<T>))
        .route("/api/payments/:aoid", get(query_payment::<T>))
        .with_state(state)
        .merge(notify_router(client, callback))
        .layer(TraceLayer::new_for_http())
}
