use crate::domain::task::{Task, TaskContext};
use crate::error::PayError;
use crate::repo::task_queue_repo::TaskQueue;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: i32,
    pub default_retry_delay_secs: i64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            default_retry_delay_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryDirective {
    RunAt(DateTime<Utc>),
    Exhausted,
}

pub fn next_attempt(policy: &RetryPolicy, retries: i32, now: DateTime<Utc>) -> RetryDirective {
    if retries >= policy.max_retries.max(0) {
        RetryDirective::Exhausted
    } else {
        RetryDirective::RunAt(now + Duration::seconds(policy.default_retry_delay_secs.max(0)))
    }
}

/// Re-queues `task` for a later run. Fails with `MaxRetriesExceeded` once the
/// policy's budget is spent.
pub async fn retry(
    queue: &dyn TaskQueue,
    policy: &RetryPolicy,
    task: &Task,
    ctx: &TaskContext,
) -> Result<i64> {
    match next_attempt(policy, ctx.retries, Utc::now()) {
        RetryDirective::Exhausted => {
            Err(PayError::MaxRetriesExceeded(format!("{}({})", task.name(), task.transaction_uuid())).into())
        }
        RetryDirective::RunAt(run_at) => {
            let id = queue.enqueue(task, ctx.retries + 1, run_at).await?;
            tracing::warn!(
                task = task.name(),
                transaction_uuid = task.transaction_uuid(),
                retry = ctx.retries + 1,
                %run_at,
                "task scheduled for retry"
            );
            Ok(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedules_after_default_delay() {
        let now = Utc::now();
        let directive = next_attempt(&RetryPolicy::default(), 0, now);
        assert_eq!(directive, RetryDirective::RunAt(now + Duration::seconds(15)));
    }

    #[test]
    fn exhausted_at_max_retries() {
        let policy = RetryPolicy {
            max_retries: 2,
            default_retry_delay_secs: 1,
        };
        assert!(matches!(next_attempt(&policy, 1, Utc::now()), RetryDirective::RunAt(_)));
        assert_eq!(next_attempt(&policy, 2, Utc::now()), RetryDirective::Exhausted);
    }

    #[test]
    fn zero_budget_never_retries() {
        let policy = RetryPolicy {
            max_retries: 0,
            default_retry_delay_secs: 15,
        };
        assert_eq!(next_attempt(&policy, 0, Utc::now()), RetryDirective::Exhausted);
    }
}
