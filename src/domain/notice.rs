use serde::{Deserialize, Serialize};

pub const TYP_POSTBACK: &str = "mozilla/payments/pay/postback/v1";
pub const TYP_CHARGEBACK: &str = "mozilla/payments/pay/chargeback/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargebackReason {
    Refund,
    Reversal,
}

impl ChargebackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargebackReason::Refund => "refund",
            ChargebackReason::Reversal => "reversal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeType {
    Postback,
    Chargeback(ChargebackReason),
}

impl NoticeType {
    pub fn typ(&self) -> &'static str {
        match self {
            NoticeType::Postback => TYP_POSTBACK,
            NoticeType::Chargeback(_) => TYP_CHARGEBACK,
        }
    }

    pub fn reason(&self) -> Option<ChargebackReason> {
        match self {
            NoticeType::Postback => None,
            NoticeType::Chargeback(reason) => Some(*reason),
        }
    }

    /// Key in the pay request naming where this notice is delivered.
    pub fn url_field(&self) -> &'static str {
        match self {
            NoticeType::Postback => "postbackURL",
            NoticeType::Chargeback(_) => "chargebackURL",
        }
    }
}

/// Latest delivery attempt for one (transaction, url) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: i64,
    pub transaction_uuid: String,
    pub url: String,
    pub success: bool,
    pub last_error: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub modified_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoticeOutcome {
    pub transaction_uuid: String,
    pub url: String,
    pub success: bool,
    pub last_error: String,
}
