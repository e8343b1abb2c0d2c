use crate::domain::notice::{Notice, NoticeOutcome};
use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait::async_trait]
pub trait NoticeStore: Send + Sync {
    /// Records an attempt, replacing the previous outcome for the same
    /// transaction and url.
    async fn record(&self, outcome: NoticeOutcome) -> Result<Notice>;

    async fn list_for_transaction(&self, transaction_uuid: &str) -> Result<Vec<Notice>>;
}

#[derive(Clone)]
pub struct NoticeRepo {
    pub pool: PgPool,
}

fn from_row(row: PgRow) -> Notice {
    Notice {
        id: row.get("id"),
        transaction_uuid: row.get("transaction_uuid"),
        url: row.get("url"),
        success: row.get("success"),
        last_error: row.get("last_error"),
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
    }
}

#[async_trait::async_trait]
impl NoticeStore for NoticeRepo {
    async fn record(&self, outcome: NoticeOutcome) -> Result<Notice> {
        let row = sqlx::query(
            r#"
            INSERT INTO notices (transaction_uuid, url, success, last_error)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (transaction_uuid, url) DO UPDATE SET
                success=EXCLUDED.success,
                last_error=EXCLUDED.last_error,
                modified_at=now()
            RETURNING id, transaction_uuid, url, success, last_error, created_at, modified_at
            "#,
        )
        .bind(outcome.transaction_uuid)
        .bind(outcome.url)
        .bind(outcome.success)
        .bind(outcome.last_error)
        .fetch_one(&self.pool)
        .await?;

        Ok(from_row(row))
    }

    async fn list_for_transaction(&self, transaction_uuid: &str) -> Result<Vec<Notice>> {
        let rows = sqlx::query(
            r#"
            SELECT id, transaction_uuid, url, success, last_error, created_at, modified_at
            FROM notices
            WHERE transaction_uuid=$1
            ORDER BY id ASC
            "#,
        )
        .bind(transaction_uuid)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(from_row).collect())
    }
}
