use crate::domain::task::Task;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub id: i64,
    pub task: Task,
    pub attempts: i32,
}

#[async_trait::async_trait]
pub trait TaskQueue: Send + Sync {
    /// Schedules `task` to run at `run_at`. `attempts` counts the runs that
    /// already happened.
    async fn enqueue(&self, task: &Task, attempts: i32, run_at: DateTime<Utc>) -> Result<i64>;

    async fn pending_count(&self) -> Result<i64>;
}

#[derive(Clone)]
pub struct TaskQueueRepo {
    pub pool: PgPool,
}

/// Worker-side view of the queue. Locked rows are PROCESSING until marked;
/// rows held longer than the lease are handed out again.
#[async_trait::async_trait]
pub trait TaskLease: Send + Sync {
    async fn lock_due(&self, batch_size: i64, lease: Duration) -> Result<Vec<QueuedTask>>;

    async fn mark_done(&self, id: i64) -> Result<()>;

    async fn mark_failed(&self, id: i64, error: &str) -> Result<()>;
}

/// PROCESSING rows last touched before this instant were abandoned by a
/// worker and are due again.
pub fn lease_cutoff(now: DateTime<Utc>, lease: Duration) -> DateTime<Utc> {
    let lease = chrono::Duration::from_std(lease).unwrap_or(chrono::Duration::MAX);
    now.checked_sub_signed(lease).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[async_trait::async_trait]
impl TaskLease for TaskQueueRepo {
    async fn lock_due(&self, batch_size: i64, lease: Duration) -> Result<Vec<QueuedTask>> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, task_json, attempts
            FROM task_queue
            WHERE (status = 'PENDING' AND next_attempt_at <= now())
               OR (status = 'PROCESSING' AND updated_at < $2)
            ORDER BY next_attempt_at ASC, id ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(batch_size)
        .bind(lease_cutoff(Utc::now(), lease))
        .fetch_all(tx.as_mut())
        .await?;

        if rows.is_empty() {
            tx.rollback().await?;
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.get("id")).collect();
        sqlx::query("UPDATE task_queue SET status = 'PROCESSING', updated_at = now() WHERE id = ANY($1)")
            .bind(&ids)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let id: i64 = r.get("id");
            let raw: serde_json::Value = r.get("task_json");
            match serde_json::from_value::<Task>(raw) {
                Ok(task) => out.push(QueuedTask {
                    id,
                    task,
                    attempts: r.get("attempts"),
                }),
                Err(e) => {
                    tracing::error!("task {} has an unreadable payload: {}", id, e);
                    // Left PROCESSING on failure; the lease brings it back.
                    if let Err(mark_err) = self.mark_failed(id, &format!("unreadable task payload: {e}")).await {
                        tracing::error!("could not mark task {} failed: {}", id, mark_err);
                    }
                }
            }
        }
        Ok(out)
    }

    async fn mark_done(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE task_queue SET status='DONE', last_error=NULL, updated_at=now() WHERE id=$1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_failed(&self, id: i64, error: &str) -> Result<()> {
        sqlx::query("UPDATE task_queue SET status='FAILED', last_error=$2, updated_at=now() WHERE id=$1")
            .bind(id)
            .bind(error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TaskQueue for TaskQueueRepo {
    async fn enqueue(&self, task: &Task, attempts: i32, run_at: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO task_queue (task_name, transaction_uuid, task_json, status, attempts, next_attempt_at)
            VALUES ($1, $2, $3, 'PENDING', $4, $5)
            RETURNING id
            "#,
        )
        .bind(task.name())
        .bind(task.transaction_uuid())
        .bind(serde_json::to_value(task)?)
        .bind(attempts)
        .bind(run_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn pending_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT count(*) AS n FROM task_queue WHERE status='PENDING'")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
