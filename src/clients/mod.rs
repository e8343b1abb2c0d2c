use crate::domain::transaction::{Transaction, TransactionStatus, TransactionType};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod marketplace;
pub mod solitude;

/// Solitude's paging envelope for filtered list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub meta: ListMeta,
    #[serde(default = "Vec::new")]
    pub objects: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListMeta {
    pub total_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerBango {
    pub resource_uri: String,
    #[serde(default)]
    pub package_id: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub resource_pk: i64,
    pub uuid: String,
    #[serde(default)]
    pub resource_uri: Option<String>,
    #[serde(default)]
    pub bango: Option<SellerBango>,
}

impl Seller {
    pub fn uri(&self) -> String {
        self.resource_uri
            .clone()
            .unwrap_or_else(|| format!("/generic/seller/{}/", self.resource_pk))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BangoProduct {
    pub resource_pk: i64,
    pub resource_uri: String,
    #[serde(default)]
    pub bango_id: Option<String>,
    #[serde(default)]
    pub seller_product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: serde_json::Value,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    pub prices: Vec<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRequest {
    #[serde(rename = "pageTitle")]
    pub page_title: String,
    pub prices: Vec<Price>,
    pub transaction_uuid: String,
    pub seller_product_bango: String,
    pub redirect_url_onsuccess: String,
    pub redirect_url_onerror: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(rename = "billingConfigurationId")]
    pub billing_configuration_id: serde_json::Value,
    #[serde(rename = "responseCode", default)]
    pub response_code: Option<String>,
    #[serde(rename = "responseMessage", default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub resource_uri: Option<String>,
}

impl BillingConfig {
    pub fn bill_id(&self) -> String {
        match &self.billing_configuration_id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

pub const PROVIDER_BANGO: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub provider: i64,
    pub seller_product: Option<String>,
    pub source: String,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub uuid: String,
    pub uid_pay: String,
}

/// Operations webpay needs from solitude, the billing service.
#[async_trait::async_trait]
pub trait BillingApi: Send + Sync {
    async fn get_transaction(&self, uuid: &str) -> Result<Transaction>;

    /// Shared secret of the product registered under an app's public id.
    async fn get_secret(&self, public_id: &str) -> Result<String>;

    async fn get_seller(&self, uuid: &str) -> Result<Option<Seller>>;

    async fn get_bango_product(&self, seller_id: i64, external_id: &str) -> Result<Option<BangoProduct>>;

    async fn create_bango_product(
        &self,
        seller: &Seller,
        external_id: &str,
        name: &str,
    ) -> Result<BangoProduct>;

    async fn create_billing(&self, request: &BillingRequest) -> Result<BillingConfig>;

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<()>;
}

/// Price tier lookups against the marketplace.
#[async_trait::async_trait]
pub trait PricingApi: Send + Sync {
    async fn get_price(&self, tier: &str) -> Result<PriceTier>;
}
