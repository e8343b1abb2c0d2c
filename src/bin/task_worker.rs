use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use webpay::clients::marketplace::MarketplaceClient;
use webpay::clients::solitude::SolitudeClient;
use webpay::config::AppConfig;
use webpay::repo::notice_repo::NoticeRepo;
use webpay::repo::task_queue_repo::TaskQueueRepo;
use webpay::service::notice_sender::NoticeSender;
use webpay::service::notify_service::{NotifyService, NotifySettings};
use webpay::service::pay_service::{PayService, PaySettings};
use webpay::service::task_retry::RetryPolicy;
use webpay::service::task_worker::{TaskRunner, TaskWorker};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cfg.database_url)
        .await?;

    let client = reqwest::Client::new();
    let billing = Arc::new(SolitudeClient {
        base_url: cfg.solitude_url.clone(),
        timeout: cfg.api_timeout(),
        client: client.clone(),
    });
    let pricing = Arc::new(MarketplaceClient {
        base_url: cfg.marketplace_url.clone(),
        timeout: cfg.api_timeout(),
        client: client.clone(),
    });
    let queue = TaskQueueRepo { pool: pool.clone() };

    let notify = NotifyService {
        billing: billing.clone(),
        notices: Arc::new(NoticeRepo { pool: pool.clone() }),
        queue: Arc::new(queue.clone()),
        sender: NoticeSender {
            client,
            timeout: cfg.notify_timeout(),
        },
        retry_policy: RetryPolicy {
            max_retries: cfg.task_max_retries,
            default_retry_delay_secs: cfg.task_retry_delay_secs,
        },
        settings: NotifySettings {
            issuer: cfg.notify_issuer.clone(),
            marketplace_key: cfg.marketplace_key.clone(),
            marketplace_secret: cfg.marketplace_secret.clone(),
            expiry_secs: cfg.notice_expiry_secs,
        },
    };
    let pay = PayService {
        billing,
        pricing,
        settings: PaySettings {
            marketplace_key: cfg.marketplace_key.clone(),
            success_redirect_url: cfg.success_redirect_url(),
            error_redirect_url: cfg.error_redirect_url(),
        },
    };

    let worker = TaskWorker {
        queue: Arc::new(queue),
        runner: TaskRunner { notify, pay },
        batch_size: 50,
        poll_interval: std::time::Duration::from_millis(500),
        lease: cfg.task_lease(),
    };

    tracing::info!("task worker started");
    worker.run().await;
    Ok(())
}
