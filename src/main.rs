use bufpay_rs::api::{self, AppState, NotifyCallback};
use bufpay_rs::application::PaymentService;
use bufpay_rs::{BufPayClient, BufPayConfig, NotificationPayload};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting BufPay service...");

    // 初始化 BufPay 配置
    let config = Arc::new(BufPayConfig::from_env()?);
    info!(
        "BufPay configuration loaded for app: {} ({})",
        config.credentials.app_id(),
        config.base_url
    );

    let client = Arc::new(BufPayClient::new(config)?);
    let payment_service = Arc::new(PaymentService::new(client.clone()));

    // 示例回调：只记录已验签的订单
    let callback: NotifyCallback = Arc::new(|payload: &NotificationPayload| -> anyhow::Result<()> {
        info!(
            "Payment confirmed: order {} paid {} (aoid {})",
            payload.order_id.as_deref().unwrap_or_default(),
            payload.pay_price.as_deref().unwrap_or_default(),
            payload.aoid.as_deref().unwrap_or_default()
        );
        Ok(())
    });

    let app = api::create_router(AppState { payment_service }, client, Some(callback));

    // 启动服务器
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  POST /api/payments - Create payment");
    info!("  GET  /api/payments/:aoid - Query payment");
    info!("  POST {} - BufPay notification", api::NOTIFY_PATH);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
