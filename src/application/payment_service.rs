use crate::application::dto::CreatePaymentRequest;
use crate::domain::errors::DomainResult;
use crate::domain::{PaymentDetails, PaymentStatus};
use crate::ports::BufPayPort;
use std::sync::Arc;
use tracing::{debug, info};

/// 支付服务
pub struct PaymentService<T: BufPayPort> {
    bufpay: Arc<T>,
}

impl<T: BufPayPort> PaymentService<T> {
    pub fn new(bufpay: Arc<T>) -> Self {
        Self { bufpay }
    }

    /// 创建支付订单
    ///
    /// 校验失败时直接返回错误，不会请求网关。
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> DomainResult<PaymentDetails> {
        let request = request.into_payment_request()?;
        info!(
            "Creating {} payment for order: {}",
            request.pay_type(),
            request.order_id()
        );

        let details = self.bufpay.create_payment(&request).await?;
        debug!("Payment created for order: {}", request.order_id());

        Ok(details)
    }

    /// 查询订单
    pub async fn query_payment(&self, aoid: &str) -> DomainResult<PaymentStatus> {
        info!("Querying payment: {}", aoid);
        self.bufpay.query_payment(aoid).await
    }
}
