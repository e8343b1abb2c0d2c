use crate::domain::pay_request::PayRequest;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Checked,
    Received,
    Failed,
    Cancelled,
}

impl TryFrom<i64> for TransactionStatus {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Completed),
            2 => Ok(Self::Checked),
            3 => Ok(Self::Received),
            4 => Ok(Self::Failed),
            5 => Ok(Self::Cancelled),
            other => Err(format!("unknown transaction status {other}")),
        }
    }
}

impl From<TransactionStatus> for i64 {
    fn from(s: TransactionStatus) -> i64 {
        match s {
            TransactionStatus::Pending => 0,
            TransactionStatus::Completed => 1,
            TransactionStatus::Checked => 2,
            TransactionStatus::Received => 3,
            TransactionStatus::Failed => 4,
            TransactionStatus::Cancelled => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TransactionType {
    Payment,
    Refund,
    Reversal,
}

impl TryFrom<i64> for TransactionType {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Payment),
            1 => Ok(Self::Refund),
            2 => Ok(Self::Reversal),
            other => Err(format!("unknown transaction type {other}")),
        }
    }
}

impl From<TransactionType> for i64 {
    fn from(t: TransactionType) -> i64 {
        match t {
            TransactionType::Payment => 0,
            TransactionType::Refund => 1,
            TransactionType::Reversal => 2,
        }
    }
}

/// Notes webpay stores on a solitude transaction when the payment starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionNotes {
    #[serde(default)]
    pub issuer_key: Option<String>,
    #[serde(default)]
    pub pay_request: Option<PayRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub uuid: String,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, deserialize_with = "notes_from_string_or_object")]
    pub notes: TransactionNotes,
    #[serde(default)]
    pub resource_pk: Option<serde_json::Value>,
}

/// Solitude keeps notes as a JSON encoded string; older fixtures and some
/// endpoints hand back the decoded object instead.
fn notes_from_string_or_object<'de, D>(deserializer: D) -> Result<TransactionNotes, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(TransactionNotes::default()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(TransactionNotes::default()),
        Some(serde_json::Value::String(s)) => {
            serde_json::from_str(&s).map_err(serde::de::Error::custom)
        }
        Some(v) => serde_json::from_value(v).map_err(serde::de::Error::custom),
    }
}
