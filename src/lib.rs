//! BufPay 支付网关客户端
//!
//! - [`BufPayClient`]：创建支付、查询支付、验证异步通知签名
//! - [`api::notify_router`]：`POST /bufpay/notify` 回调路由，验签通过后调用业务回调
//!
//! 签名算法为 BufPay 规定的 MD5（大写十六进制），仅为与网关兼容而使用。

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use api::{notify_router, NotifyCallback, NOTIFY_PATH};
pub use domain::{
    Credentials, DomainError, DomainResult, NotificationPayload, PayType, PaymentDetails,
    PaymentRequest, PaymentRequestBuilder, PaymentStatus,
};
pub use infrastructure::{BufPayClient, BufPayConfig};
pub use ports::BufPayPort;
