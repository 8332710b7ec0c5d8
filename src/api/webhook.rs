use crate::domain::NotificationPayload;
use crate::ports::BufPayPort;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// BufPay 异步通知路径
pub const NOTIFY_PATH: &str = "/bufpay/notify";

const SUCCESS_BODY: &str = "success";
const INVALID_SIGNATURE_BODY: &str = "Invalid signature";
const CALLBACK_FAILED_BODY: &str = "Callback failed";

/// 验签通过后调用的回调
///
/// 回调同步执行；返回 `Err` 时响应 500，网关会按自身策略重新推送。
pub type NotifyCallback = Arc<dyn Fn(&NotificationPayload) -> anyhow::Result<()> + Send + Sync>;

/// 通知路由状态
pub struct NotifyState<T: BufPayPort> {
    pub client: Arc<T>,
    pub callback: Option<NotifyCallback>,
}

impl<T: BufPayPort> Clone for NotifyState<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            callback: self.callback.clone(),
        }
    }
}

/// 创建只包含通知路由的 Router，可合并到宿主应用中
pub fn notify_router<T: BufPayPort + 'static>(
    client: Arc<T>,
    callback: Option<NotifyCallback>,
) -> Router {
    Router::new()
        .route(NOTIFY_PATH, post(bufpay_notify::<T>))
        .with_state(NotifyState { client, callback })
}

/// BufPay 支付回调
pub async fn bufpay_notify<T: BufPayPort + 'static>(
    State(state): State<NotifyState<T>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match parse_payload(&headers, &body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Failed to parse BufPay notification: {}", e);
            return (StatusCode::BAD_REQUEST, INVALID_SIGNATURE_BODY).into_response();
        }
    };

    if !state.client.verify_notification(&payload) {
        return (StatusCode::BAD_REQUEST, INVALID_SIGNATURE_BODY).into_response();
    }

    let aoid = payload.aoid.as_deref().unwrap_or_default();
    info!("Verified BufPay notification: {}", aoid);

    if let Some(callback) = &state.callback {
        if let Err(e) = callback(&payload) {
            error!("Notification callback failed for {}: {:#}", aoid, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, CALLBACK_FAILED_BODY).into_response();
        }
    }

    (StatusCode::OK, SUCCESS_BODY).into_response()
}

/// 按 Content-Type 解析通知：表单或 JSON 对象（默认）
fn parse_payload(headers: &HeaderMap, body: &[u8]) -> Result<NotificationPayload, String> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| {
            media_type
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        });

    if is_form {
        return serde_urlencoded::from_bytes(body).map_err(|e| e.to_string());
    }

    match serde_json::from_slice::<serde_json::Value>(body).map_err(|e| e.to_string())? {
        value @ serde_json::Value::Object(_) => {
            serde_json::from_value(value).map_err(|e| e.to_string())
        }
        _ => Err("notification body must be a JSON object".to_string()),
    }
}
