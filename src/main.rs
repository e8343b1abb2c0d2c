use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use webpay::config::AppConfig;
use webpay::http::routes::router;
use webpay::repo::notice_repo::NoticeRepo;
use webpay::repo::task_queue_repo::TaskQueueRepo;
use webpay::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState {
        notice_store: Arc::new(NoticeRepo { pool: pool.clone() }),
        task_queue: Arc::new(TaskQueueRepo { pool: pool.clone() }),
    };

    let app = router(state, cfg.internal_api_key.clone());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
