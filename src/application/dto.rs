use crate::domain::errors::DomainResult;
use crate::domain::{PayType, PaymentRequest};
use serde::{Deserialize, Serialize};

/// 创建支付请求
///
/// 字段均为可选，缺失的必填字段在转换为 [`PaymentRequest`] 时报告。
#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentRequest {
    /// 商品名称
    pub name: Option<String>,

    /// 支付方式
    pub pay_type: Option<PayType>,

    /// 价格（元）
    pub price: Option<String>,

    /// 商户订单号
    pub order_id: Option<String>,

    /// 商户侧用户标识
    pub order_uid: Option<String>,

    /// 异步通知地址
    pub notify_url: Option<String>,

    /// 支付完成跳转地址
    pub return_url: Option<String>,

    pub feedback_url: Option<String>,
}

impl CreatePaymentRequest {
    pub fn into_payment_request(self) -> DomainResult<PaymentRequest> {
        let mut builder = PaymentRequest::builder();
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(pay_type) = self.pay_type {
            builder = builder.pay_type(pay_type);
        }
        if let Some(price) = self.price {
            builder = builder.price(price);
        }
        if let Some(order_id) = self.order_id {
            builder = builder.order_id(order_id);
        }
        if let Some(order_uid) = self.order_uid {
            builder = builder.order_uid(order_uid);
        }
        if let Some(notify_url) = self.notify_url {
            builder = builder.notify_url(notify_url);
        }
        if let Some(return_url) = self.return_url {
            builder = builder.return_url(return_url);
        }
        if let Some(feedback_url) = self.feedback_url {
            builder = builder.feedback_url(feedback_url);
        }
        builder.build()
    }
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: String, message: String) -> Self {
        Self { error, message }
    }
}
