use crate::domain::task::{Task, TaskContext};
use crate::repo::task_queue_repo::TaskLease;
use crate::service::notify_service::NotifyService;
use crate::service::pay_service::PayService;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct TaskRunner {
    pub notify: NotifyService,
    pub pay: PayService,
}

impl TaskRunner {
    pub async fn run(&self, task: &Task, ctx: &TaskContext) -> Result<()> {
        match task {
            Task::PaymentNotify { transaction_uuid } => {
                self.notify.payment_notify(transaction_uuid, ctx).await?;
            }
            Task::ChargebackNotify {
                transaction_uuid,
                reason,
            } => {
                self.notify.chargeback_notify(transaction_uuid, *reason, ctx).await?;
            }
            Task::StartPay {
                transaction_uuid,
                notes,
            } => {
                self.pay.start_pay(transaction_uuid, notes).await?;
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct TaskWorker {
    pub queue: Arc<dyn TaskLease>,
    pub runner: TaskRunner,
    pub batch_size: i64,
    pub poll_interval: Duration,
    pub lease: Duration,
}

impl TaskWorker {
    pub async fn run(self) {
        loop {
            if let Err(err) = self.tick().await {
                tracing::error!("task worker error: {}", err);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Runs one locked batch. A row whose outcome cannot be written stays
    /// PROCESSING and is picked up again once its lease runs out.
    pub async fn tick(&self) -> Result<usize> {
        let batch = self.queue.lock_due(self.batch_size, self.lease).await?;
        let n = batch.len();

        for item in batch {
            let ctx = TaskContext {
                task_id: Some(item.id),
                retries: item.attempts,
            };
            let marked = match self.runner.run(&item.task, &ctx).await {
                Ok(()) => self.queue.mark_done(item.id).await,
                Err(e) => {
                    tracing::error!(
                        task = item.task.name(),
                        transaction_uuid = item.task.transaction_uuid(),
                        "task {} failed: {:#}",
                        item.id,
                        e
                    );
                    self.queue.mark_failed(item.id, &format!("{e:#}")).await
                }
            };
            if let Err(e) = marked {
                tracing::error!("could not record outcome of task {}: {:#}", item.id, e);
            }
        }

        Ok(n)
    }
}
