use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{NotificationPayload, PaymentDetails, PaymentRequest, PaymentStatus};
use crate::infrastructure::config::bufpay_config::BufPayConfig;
use crate::ports::BufPayPort;
use async_trait::async_trait;
use md5::{Digest, Md5};
use reqwest::{Client, Response, Url};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

/// 创建支付时提交的表单，字段名为网关使用的外部名称
#[derive(Debug, Serialize)]
struct PayForm<'a> {
    name: &'a str,
    pay_type: &'a str,
    price: &'a str,
    order_id: &'a str,
    order_uid: &'a str,
    notify_url: &'a str,
    return_url: &'a str,
    feedback_url: &'a str,
    sign: &'a str,
}

/// BufPay 客户端
///
/// 只持有只读凭证和一个 reqwest 连接，可以在任务之间自由克隆共享。
#[derive(Clone)]
pub struct BufPayClient {
    config: Arc<BufPayConfig>,
    client: Client,
}

impl BufPayClient {
    pub fn new(config: Arc<BufPayConfig>) -> DomainResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            DomainError::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { config, client })
    }

    /// 计算签名：按顺序拼接存在的字段，末尾追加密钥，取 MD5 的大写十六进制
    ///
    /// MD5 是 BufPay 网关规定的签名算法，只为兼容保留，不要在新协议中沿用。
    fn sign(&self, fields: &[Option<&str>]) -> String {
        let mut hasher = Md5::new();
        for field in fields.iter().flatten() {
            hasher.update(field.as_bytes());
        }
        hasher.update(self.config.credentials.app_secret().as_bytes());
        hex::encode_upper(hasher.finalize())
    }

    fn sign_payment(&self, request: &PaymentRequest) -> String {
        self.sign(&[
            Some(request.name()),
            Some(request.pay_type().as_str()),
            Some(request.price()),
            Some(request.order_id()),
            Some(request.order_uid()),
            Some(request.notify_url()),
            Some(request.return_url()),
            Some(request.feedback_url()),
        ])
    }

    fn endpoint(&self, segments: &[&str]) -> DomainResult<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            DomainError::ConfigurationError(format!(
                "Invalid base URL {}: {}",
                self.config.base_url, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DomainError::ConfigurationError(format!(
                    "Base URL cannot carry a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 检查响应状态并原样解析 JSON 响应体
    async fn read_response(response: Response, action: &str) -> DomainResult<serde_json::Value> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("BufPay {} failed: {} - {}", action, status, error_text);
            return Err(DomainError::GatewayError(format!(
                "{} returned {}: {}",
                action, status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!("BufPay {} returned a non-JSON body: {}", action, e);
            DomainError::GatewayError(format!("{} returned an unreadable body: {}", action, e))
        })
    }
}

#[async_trait]
impl BufPayPort for BufPayClient {
    /// 创建支付订单
    async fn create_payment(&self, request: &PaymentRequest) -> DomainResult<PaymentDetails> {
        let sign = self.sign_payment(request);
        let form = PayForm {
            name: request.name(),
            pay_type: request.pay_type().as_str(),
            price: request.price(),
            order_id: request.order_id(),
            order_uid: request.order_uid(),
            notify_url: request.notify_url(),
            return_url: request.return_url(),
            feedback_url: request.feedback_url(),
            sign: &sign,
        };

        let mut url = self.endpoint(&["pay", self.config.credentials.app_id()])?;
        url.query_pairs_mut().append_pair("format", "json");
        debug!("BufPay pay request for order {}: {}", request.order_id(), url);

        let response = self.client.post(url).form(&form).send().await?;
        let details = Self::read_response(response, "pay").await?;
        debug!("BufPay pay response: {}", details);

        Ok(details)
    }

    /// 查询订单
    async fn query_payment(&self, aoid: &str) -> DomainResult<PaymentStatus> {
        if aoid.is_empty() {
            return Err(DomainError::ValidationError(
                "Missing required field: aoid".to_string(),
            ));
        }
        // URL 会把 "." 和 ".." 当作路径操作吞掉，请求会落到其他接口
        if aoid == "." || aoid == ".." {
            return Err(DomainError::ValidationError(format!(
                "Invalid aoid: {:?}",
                aoid
            )));
        }

        let url = self.endpoint(&["query", aoid])?;
        debug!("BufPay query request: {}", url);

        let response = self.client.get(url).send().await?;
        Self::read_response(response, "query").await
    }

    /// 验证回调通知签名
    fn verify_notification(&self, payload: &NotificationPayload) -> bool {
        let (Some(fields), Some(sign)) = (payload.signed_fields(), payload.sign.as_deref()) else {
            warn!("Notification rejected: missing required fields");
            return false;
        };

        let expected = self.sign(&fields.map(Some));
        let verified: bool = expected.as_bytes().ct_eq(sign.as_bytes()).into();
        if !verified {
            warn!(
                "Notification rejected: signature mismatch for aoid {}",
                fields[0]
            );
        }
        verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PayType;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_with(secret: &str, base_url: &str) -> BufPayClient {
        let config = BufPayConfig::new("app-id", secret).with_base_url(base_url);
        BufPayClient::new(Arc::new(config)).unwrap()
    }

    fn notification(pay_price: &str, sign: &str) -> NotificationPayload {
        NotificationPayload {
            aoid: Some("A1".to_string()),
            order_id: Some("O1".to_string()),
            order_uid: Some("U1".to_string()),
            price: Some("10.00".to_string()),
            pay_price: Some(pay_price.to_string()),
            sign: Some(sign.to_string()),
        }
    }

    fn payment_request() -> PaymentRequest {
        PaymentRequest::builder()
            .name("Test item")
            .pay_type(PayType::Alipay)
            .price("9.99")
            .order_id("ORD-1")
            .order_uid("UID-1")
            .notify_url("https://shop.example/notify")
            .build()
            .unwrap()
    }

    // MD5("A1O1U110.009.50s3cr3t")
    const KNOWN_SIGN: &str = "74B9C32E2193536FABA89038613BA834";

    #[test]
    fn test_sign_known_vector() {
        let client = client_with("s3cr3t", "http://localhost");
        let sign = client.sign(&[
            Some("A1"),
            Some("O1"),
            Some("U1"),
            Some("10.00"),
            Some("9.50"),
        ]);

        assert_eq!(sign, KNOWN_SIGN);
        assert_eq!(sign.len(), 32);
    }

    #[test]
    fn test_sign_skips_absent_keeps_empty() {
        let client = client_with("s3cr3t", "http://localhost");

        let with_absent = client.sign(&[Some("A1"), None, Some("O1"), Some("U1"), Some("10.00"), Some("9.50")]);
        let with_empty = client.sign(&[Some("A1"), Some(""), Some("O1"), Some("U1"), Some("10.00"), Some("9.50")]);

        assert_eq!(with_absent, KNOWN_SIGN);
        assert_eq!(with_empty, KNOWN_SIGN);
        assert_ne!(client.sign(&[Some("O1"), Some("A1")]), client.sign(&[Some("A1"), Some("O1")]));
    }

    #[test]
    fn test_verify_notification() {
        let client = client_with("s3cr3t", "http://localhost");

        assert!(client.verify_notification(&notification("9.50", KNOWN_SIGN)));
        assert!(!client.verify_notification(&notification("9.51", KNOWN_SIGN)));
        assert!(!client.verify_notification(&notification("9.50", &KNOWN_SIGN.to_lowercase())));
        assert!(!client.verify_notification(&notification("9.50", "")));
    }

    #[test]
    fn test_verify_notification_wrong_secret() {
        let client = client_with("another-secret", "http://localhost");
        assert!(!client.verify_notification(&notification("9.50", KNOWN_SIGN)));
    }

    #[test]
    fn test_verify_notification_missing_fields() {
        let client = client_with("s3cr3t", "http://localhost");
        let complete = notification("9.50", KNOWN_SIGN);

        let variants = [
            NotificationPayload { aoid: None, ..complete.clone() },
            NotificationPayload { order_id: None, ..complete.clone() },
            NotificationPayload { order_uid: None, ..complete.clone() },
            NotificationPayload { price: None, ..complete.clone() },
            NotificationPayload { pay_price: None, ..complete.clone() },
            NotificationPayload { sign: None, ..complete.clone() },
        ];

        for payload in variants {
            assert!(!client.verify_notification(&payload), "{:?}", payload);
        }
        assert!(!client.verify_notification(&NotificationPayload::default()));
    }

    #[test]
    fn test_payment_and_notification_signing_agree() {
        let client = client_with("app-secret", "http://localhost");
        let sign = client.sign(&[
            Some("AOID-1"),
            Some("ORD-1"),
            Some("UID-1"),
            Some("9.99"),
            Some("9.99"),
        ]);
        let payload = NotificationPayload {
            aoid: Some("AOID-1".to_string()),
            order_id: Some("ORD-1".to_string()),
            order_uid: Some("UID-1".to_string()),
            price: Some("9.99".to_string()),
            pay_price: Some("9.99".to_string()),
            sign: Some(sign),
        };

        assert!(client.verify_notification(&payload));
        // MD5("AOID-1ORD-1UID-19.999.99app-secret")
        assert_eq!(payload.sign.as_deref(), Some("6F1EAFDEEE73D58614FE571C2595BC01"));
    }

    #[test]
    fn test_sign_payment_defaults_optional_urls() {
        let client = client_with("app-secret", "http://localhost");

        // MD5("Test itemalipay9.99ORD-1UID-1https://shop.example/notifyapp-secret")
        assert_eq!(
            client.sign_payment(&payment_request()),
            "DEE0CDBCB23BD9EE120CC7B3EB1E2386"
        );
    }

    #[tokio::test]
    async fn test_create_payment_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pay/app-id")
            .match_query(Matcher::UrlEncoded("format".into(), "json".into()))
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "Test item".into()),
                Matcher::UrlEncoded("pay_type".into(), "alipay".into()),
                Matcher::UrlEncoded("price".into(), "9.99".into()),
                Matcher::UrlEncoded("order_id".into(), "ORD-1".into()),
                Matcher::UrlEncoded("order_uid".into(), "UID-1".into()),
                Matcher::UrlEncoded("notify_url".into(), "https://shop.example/notify".into()),
                Matcher::UrlEncoded("return_url".into(), "".into()),
                Matcher::UrlEncoded("feedback_url".into(), "".into()),
                Matcher::UrlEncoded("sign".into(), "DEE0CDBCB23BD9EE120CC7B3EB1E2386".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "ok",
                    "aoid": "AOID-1",
                    "pay_price": "9.99",
                    "qr": "https://qr.example/abc"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = client_with("app-secret", &server.url());
        let details = client.create_payment(&payment_request()).await.unwrap();

        assert_eq!(details["aoid"], "AOID-1");
        assert_eq!(details["qr"], "https://qr.example/abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_payment_signs_optional_urls() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pay/app-id")
            .match_query(Matcher::Any)
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("return_url".into(), "https://shop.example/done".into()),
                Matcher::UrlEncoded("feedback_url".into(), "https://shop.example/feedback".into()),
                Matcher::UrlEncoded("sign".into(), "8846315ECA4D90D43177A1C3EE445C22".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let request = PaymentRequest::builder()
            .name("Test item")
            .pay_type(PayType::Alipay)
            .price("9.99")
            .order_id("ORD-1")
            .order_uid("UID-1")
            .notify_url("https://shop.example/notify")
            .return_url("https://shop.example/done")
            .feedback_url("https://shop.example/feedback")
            .build()
            .unwrap();

        let client = client_with("app-secret", &server.url());
        client.create_payment(&request).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_payment_gateway_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/pay/app-id")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let client = client_with("app-secret", &server.url());
        let err = client.create_payment(&payment_request()).await.unwrap_err();

        assert!(err.is_gateway_error());
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_create_payment_unreadable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/pay/app-id")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client_with("app-secret", &server.url());
        let err = client.create_payment(&payment_request()).await.unwrap_err();

        assert!(matches!(err, DomainError::GatewayError(_)));
    }

    #[tokio::test]
    async fn test_create_payment_transport_error() {
        // 未监听的端口
        let client = client_with("app-secret", "http://127.0.0.1:1");
        let err = client.create_payment(&payment_request()).await.unwrap_err();

        assert!(matches!(err, DomainError::HttpError(_)));
        assert!(err.is_gateway_error());
    }

    #[tokio::test]
    async fn test_query_payment_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/query/AOID-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"status": "success", "aoid": "AOID-1"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_with("app-secret", &server.url());
        let status = client.query_payment("AOID-1").await.unwrap();

        assert_eq!(status, json!({"status": "success", "aoid": "AOID-1"}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_payment_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/query/AOID-404")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let client = client_with("app-secret", &server.url());
        let err = client.query_payment("AOID-404").await.unwrap_err();

        assert!(matches!(err, DomainError::GatewayError(_)));
    }

    #[tokio::test]
    async fn test_query_payment_empty_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_with("app-secret", &server.url());
        let err = client.query_payment("").await.unwrap_err();

        assert!(matches!(err, DomainError::ValidationError(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_payment_dot_segments() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_with("app-secret", &server.url());
        for aoid in [".", ".."] {
            let err = client.query_payment(aoid).await.unwrap_err();
            assert!(matches!(err, DomainError::ValidationError(_)), "{}", aoid);
        }

        mock.assert_async().await;
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let client = client_with("app-secret", "https://bufpay.com/api");

        let url = client.endpoint(&["query", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "https://bufpay.com/api/query/a%2Fb%20c");

        let url = client.endpoint(&["pay", "app-id"]).unwrap();
        assert_eq!(url.as_str(), "https://bufpay.com/api/pay/app-id");
    }

    #[test]
    fn test_endpoint_on_bare_host() {
        let client = client_with("app-secret", "http://127.0.0.1:8080");
        let url = client.endpoint(&["query", "AOID-1"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/query/AOID-1");
    }
}
