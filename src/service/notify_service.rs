use crate::clients::BillingApi;
use crate::domain::notice::{ChargebackReason, Notice, NoticeOutcome, NoticeType};
use crate::domain::task::{Task, TaskContext};
use crate::domain::transaction::{Transaction, TransactionType};
use crate::error::PayError;
use crate::repo::notice_repo::NoticeStore;
use crate::repo::task_queue_repo::TaskQueue;
use crate::service::notice_sender::NoticeSender;
use crate::service::task_retry::{self, RetryPolicy};
use crate::signing::{build_claims, sign_notice, NoticeParams};
use anyhow::Result;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub issuer: String,
    pub marketplace_key: String,
    pub marketplace_secret: String,
    pub expiry_secs: i64,
}

#[derive(Clone)]
pub struct NotifyService {
    pub billing: Arc<dyn BillingApi>,
    pub notices: Arc<dyn NoticeStore>,
    pub queue: Arc<dyn TaskQueue>,
    pub sender: NoticeSender,
    pub retry_policy: RetryPolicy,
    pub settings: NotifySettings,
}

impl NotifyService {
    pub async fn payment_notify(&self, transaction_uuid: &str, ctx: &TaskContext) -> Result<Notice> {
        let task = Task::PaymentNotify {
            transaction_uuid: transaction_uuid.to_string(),
        };
        self.notify(&task, NoticeType::Postback, ctx).await
    }

    pub async fn chargeback_notify(
        &self,
        transaction_uuid: &str,
        reason: ChargebackReason,
        ctx: &TaskContext,
    ) -> Result<Notice> {
        let task = Task::ChargebackNotify {
            transaction_uuid: transaction_uuid.to_string(),
            reason,
        };
        self.notify(&task, NoticeType::Chargeback(reason), ctx).await
    }

    /// The marketplace signs with its own secret; every other issuer is an
    /// app whose secret lives on its solitude product.
    pub async fn secret_for(&self, issuer_key: &str) -> Result<String> {
        if issuer_key == self.settings.marketplace_key {
            return Ok(self.settings.marketplace_secret.clone());
        }
        self.billing.get_secret(issuer_key).await
    }

    async fn notify(&self, task: &Task, notice_type: NoticeType, ctx: &TaskContext) -> Result<Notice> {
        let trans = self.billing.get_transaction(task.transaction_uuid()).await?;
        warn_on_type_mismatch(&trans, notice_type);

        let (url, signed) = self.prepare_notice(&trans, notice_type).await?;
        let sent = self.sender.send(&url, &signed, &trans.uuid).await;

        let notice = self
            .notices
            .record(NoticeOutcome {
                transaction_uuid: trans.uuid.clone(),
                url: url.clone(),
                success: sent.success,
                last_error: sent.last_error.clone(),
            })
            .await?;

        if sent.should_retry() {
            if let Err(e) = task_retry::retry(self.queue.as_ref(), &self.retry_policy, task, ctx).await {
                tracing::error!(
                    "while retrying transaction {} notice to {}: {}",
                    trans.uuid,
                    url,
                    e
                );
            }
        } else if notice.success {
            tracing::info!("{} notice for transaction {} delivered to {}", task.name(), trans.uuid, url);
        }

        Ok(notice)
    }

    async fn prepare_notice(&self, trans: &Transaction, notice_type: NoticeType) -> Result<(String, String)> {
        let issuer_key = trans
            .notes
            .issuer_key
            .as_deref()
            .ok_or_else(|| PayError::MissingNotes {
                transaction_uuid: trans.uuid.clone(),
                field: "issuer_key",
            })?;
        let pay_request = trans
            .notes
            .pay_request
            .as_ref()
            .ok_or_else(|| PayError::MissingNotes {
                transaction_uuid: trans.uuid.clone(),
                field: "pay_request",
            })?;

        let url = match notice_type {
            NoticeType::Postback => pay_request.postback_url(),
            NoticeType::Chargeback(_) => pay_request.chargeback_url(),
        }
        .ok_or(PayError::MissingCallbackUrl(notice_type.url_field()))?
        .to_string();

        let secret = self.secret_for(issuer_key).await?;
        let claims = build_claims(
            &NoticeParams {
                issuer: &self.settings.issuer,
                audience: issuer_key,
                notice_type,
                transaction_uuid: &trans.uuid,
                request: &pay_request.request,
                expiry_secs: self.settings.expiry_secs,
            },
            chrono::Utc::now().timestamp(),
        );
        let signed = sign_notice(&claims, &secret)?;
        Ok((url, signed))
    }
}

fn warn_on_type_mismatch(trans: &Transaction, notice_type: NoticeType) {
    let expected_payment = matches!(notice_type, NoticeType::Postback);
    let is_payment = trans.kind == TransactionType::Payment;
    if expected_payment != is_payment {
        tracing::warn!(
            "sending {} for transaction {} of type {:?}",
            notice_type.typ(),
            trans.uuid,
            trans.kind
        );
    }
}
