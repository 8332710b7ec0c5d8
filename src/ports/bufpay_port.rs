use crate::domain::errors::DomainResult;
use crate::domain::{NotificationPayload, PaymentDetails, PaymentRequest, PaymentStatus};
use async_trait::async_trait;

/// BufPay 网关端口接口
#[async_trait]
pub trait BufPayPort: Send + Sync {
    /// 创建支付订单，返回网关原始响应
    async fn create_payment(&self, request: &PaymentRequest) -> DomainResult<PaymentDetails>;

    /// 根据 BufPay 订单号（aoid）查询支付状态
    async fn query_payment(&self, aoid: &str) -> DomainResult<PaymentStatus>;

    /// 验证回调通知签名
    ///
    /// 任何字段缺失或签名不一致都返回 false，不会出错。
    fn verify_notification(&self, payload: &NotificationPayload) -> bool;
}
