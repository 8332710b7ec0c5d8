use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 验证错误（在任何网络请求之前发现）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// BufPay 网关返回非成功状态或无法解析的响应
    #[error("Gateway error: {0}")]
    GatewayError(String),

    /// HTTP传输错误
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl DomainError {
    /// 是否为网关侧错误（传输失败或非成功响应）
    pub fn is_gateway_error(&self) -> bool {
        matches!(self, DomainError::GatewayError(_) | DomainError::HttpError(_))
    }
}

/// 领域结果类型
pub type DomainResult<T> = Result<T, DomainError>;
