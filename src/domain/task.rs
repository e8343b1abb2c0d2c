use crate::domain::notice::ChargebackReason;
use crate::domain::transaction::TransactionNotes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum Task {
    PaymentNotify {
        transaction_uuid: String,
    },
    ChargebackNotify {
        transaction_uuid: String,
        reason: ChargebackReason,
    },
    StartPay {
        transaction_uuid: String,
        notes: TransactionNotes,
    },
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::PaymentNotify { .. } => "payment_notify",
            Task::ChargebackNotify { .. } => "chargeback_notify",
            Task::StartPay { .. } => "start_pay",
        }
    }

    pub fn transaction_uuid(&self) -> &str {
        match self {
            Task::PaymentNotify { transaction_uuid }
            | Task::ChargebackNotify { transaction_uuid, .. }
            | Task::StartPay { transaction_uuid, .. } => transaction_uuid,
        }
    }
}

/// Invocation state handed to a running task.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    pub task_id: Option<i64>,
    pub retries: i32,
}
