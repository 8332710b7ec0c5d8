use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::PayType;
use serde::{Deserialize, Deserializer, Serialize};

/// 创建支付的响应体（网关原样返回）
pub type PaymentDetails = serde_json::Value;

/// 查询支付的响应体（网关原样返回）
pub type PaymentStatus = serde_json::Value;

/// 支付请求
///
/// 只能通过 [`PaymentRequestBuilder`] 构造，因此必填字段在构造后一定存在。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    name: String,
    pay_type: PayType,
    price: String,
    order_id: String,
    order_uid: String,
    notify_url: String,
    return_url: String,
    feedback_url: String,
}

impl PaymentRequest {
    pub fn builder() -> PaymentRequestBuilder {
        PaymentRequestBuilder::default()
    }

    /// 商品名称
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pay_type(&self) -> PayType {
        self.pay_type
    }

    /// 价格（元，如 "9.99"）
    pub fn price(&self) -> &str {
        &self.price
    }

    /// 商户订单号
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// 商户侧用户标识
    pub fn order_uid(&self) -> &str {
        &self.order_uid
    }

    pub fn notify_url(&self) -> &str {
        &self.notify_url
    }

    /// 支付完成后的跳转地址，未设置时为空字符串
    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    /// 未设置时为空字符串
    pub fn feedback_url(&self) -> &str {
        &self.feedback_url
    }
}

/// 支付请求构造器
#[derive(Debug, Clone, Default)]
pub struct PaymentRequestBuilder {
    name: Option<String>,
    pay_type: Option<PayType>,
    price: Option<String>,
    order_id: Option<String>,
    order_uid: Option<String>,
    notify_url: Option<String>,
    return_url: Option<String>,
    feedback_url: Option<String>,
}

impl PaymentRequestBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn pay_type(mut self, pay_type: PayType) -> Self {
        self.pay_type = Some(pay_type);
        self
    }

    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn order_uid(mut self, order_uid: impl Into<String>) -> Self {
        self.order_uid = Some(order_uid.into());
        self
    }

    pub fn notify_url(mut self, notify_url: impl Into<String>) -> Self {
        self.notify_url = Some(notify_url.into());
        self
    }

    pub fn return_url(mut self, return_url: impl Into<String>) -> Self {
        self.return_url = Some(return_url.into());
        self
    }

    pub fn feedback_url(mut self, feedback_url: impl Into<String>) -> Self {
        self.feedback_url = Some(feedback_url.into());
        self
    }

    /// 校验必填字段并生成请求
    ///
    /// 必填字段为空字符串时同样视为缺失。可选的跳转地址在此处补为空字符串，
    /// 它们始终参与签名。
    pub fn build(self) -> DomainResult<PaymentRequest> {
        Ok(PaymentRequest {
            name: required("name", self.name)?,
            pay_type: self.pay_type.ok_or_else(|| missing("pay_type"))?,
            price: required("price", self.price)?,
            order_id: required("order_id", self.order_id)?,
            order_uid: required("order_uid", self.order_uid)?,
            notify_url: required("notify_url", self.notify_url)?,
            return_url: self.return_url.unwrap_or_default(),
            feedback_url: self.feedback_url.unwrap_or_default(),
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> DomainResult<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(missing(field)),
    }
}

fn missing(field: &'static str) -> DomainError {
    DomainError::ValidationError(format!("Missing required field: {}", field))
}

/// 支付回调通知
///
/// 来自网络的不可信数据：所有字段都可能缺失，验签通过之前不能信任任何字段。
/// 数值类型的字段会按 JSON 文本形式转换为字符串。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// BufPay 订单号
    #[serde(default, deserialize_with = "lenient_text")]
    pub aoid: Option<String>,

    /// 商户订单号
    #[serde(default, deserialize_with = "lenient_text")]
    pub order_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub order_uid: Option<String>,

    /// 订单价格
    #[serde(default, deserialize_with = "lenient_text")]
    pub price: Option<String>,

    /// 实际支付金额
    #[serde(default, deserialize_with = "lenient_text")]
    pub pay_price: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub sign: Option<String>,
}

impl NotificationPayload {
    /// 按签名顺序返回参与签名的字段，任一字段缺失时返回 None
    pub(crate) fn signed_fields(&self) -> Option<[&str; 5]> {
        Some([
            self.aoid.as_deref()?,
            self.order_id.as_deref()?,
            self.order_uid.as_deref()?,
            self.price.as_deref()?,
            self.pay_price.as_deref()?,
        ])
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        Some(serde_json::Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}
