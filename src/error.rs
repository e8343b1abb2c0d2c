use thiserror::Error;

/// Domain failures raised by the pay and notify tasks.
///
/// Service code returns these wrapped in `anyhow::Error`; callers that need
/// to branch on the kind use `err.downcast_ref::<PayError>()`.
#[derive(Debug, Error)]
pub enum PayError {
    #[error("seller {0} is not configured in solitude")]
    SellerNotConfigured(String),

    #[error("price tier {0} not found")]
    TierNotFound(String),

    #[error("marketplace {issuer_key} did not put a seller_uuid in productData: {product_data:?}")]
    MissingSellerUuid {
        issuer_key: String,
        product_data: String,
    },

    #[error("transaction {0} not found")]
    TransactionNotFound(String),

    #[error("transaction {transaction_uuid} notes missing {field}")]
    MissingNotes {
        transaction_uuid: String,
        field: &'static str,
    },

    #[error("pay request has no {0}")]
    MissingCallbackUrl(&'static str),

    #[error("no product for public id {0}")]
    ProductNotFound(String),

    #[error("max retries exceeded for task {0}")]
    MaxRetriesExceeded(String),

    #[error("{service} api error: {message}")]
    Api {
        service: &'static str,
        message: String,
    },
}

impl PayError {
    pub fn code(&self) -> &'static str {
        match self {
            PayError::SellerNotConfigured(_) => "SELLER_NOT_CONFIGURED",
            PayError::TierNotFound(_) => "TIER_NOT_FOUND",
            PayError::MissingSellerUuid { .. } => "MISSING_SELLER_UUID",
            PayError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            PayError::MissingNotes { .. } => "MISSING_NOTES",
            PayError::MissingCallbackUrl(_) => "MISSING_CALLBACK_URL",
            PayError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            PayError::MaxRetriesExceeded(_) => "MAX_RETRIES_EXCEEDED",
            PayError::Api { .. } => "UPSTREAM_API_ERROR",
        }
    }
}

pub fn api_error(service: &'static str, message: impl Into<String>) -> anyhow::Error {
    PayError::Api {
        service,
        message: message.into(),
    }
    .into()
}
