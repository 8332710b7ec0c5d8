use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::Credentials;
use std::time::Duration;

/// BufPay 生产环境 API 地址
pub const DEFAULT_BASE_URL: &str = "https://bufpay.com/api";

/// BufPay 配置
#[derive(Debug, Clone)]
pub struct BufPayConfig {
    /// 应用凭证
    pub credentials: Credentials,

    /// API基础URL（不带结尾的 `/`）
    pub base_url: String,

    /// HTTP请求超时，None 表示使用 reqwest 默认行为
    pub timeout: Option<Duration>,
}

impl BufPayConfig {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(app_id, app_secret),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 从环境变量加载配置
    ///
    /// - `BUFPAY_APP_ID`、`BUFPAY_APP_SECRET`：必填
    /// - `BUFPAY_BASE_URL`：可选，默认 [`DEFAULT_BASE_URL`]
    /// - `BUFPAY_TIMEOUT_SECS`：可选，正整数
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| DomainError::ConfigurationError(format!("{} must be set", key)))
        };

        let mut config = Self::new(require("BUFPAY_APP_ID")?, require("BUFPAY_APP_SECRET")?);

        if let Some(base_url) = lookup("BUFPAY_BASE_URL").filter(|value| !value.is_empty()) {
            config = config.with_base_url(base_url);
        }

        if let Some(raw) = lookup("BUFPAY_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    DomainError::ConfigurationError(format!(
                        "BUFPAY_TIMEOUT_SECS must be a positive integer, got {:?}",
                        raw
                    ))
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
