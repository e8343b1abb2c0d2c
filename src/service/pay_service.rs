use crate::clients::{BangoProduct, BillingApi, BillingRequest, NewTransaction, PricingApi, Seller, PROVIDER_BANGO};
use crate::domain::pay_request::PayRequest;
use crate::domain::transaction::{TransactionNotes, TransactionStatus, TransactionType};
use crate::error::PayError;
use anyhow::Result;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PaySettings {
    pub marketplace_key: String,
    pub success_redirect_url: String,
    pub error_redirect_url: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BillingSetup {
    pub bill_id: String,
    pub seller_id: i64,
}

#[derive(Clone)]
pub struct PayService {
    pub billing: Arc<dyn BillingApi>,
    pub pricing: Arc<dyn PricingApi>,
    pub settings: PaySettings,
}

impl PayService {
    pub async fn start_pay(&self, transaction_uuid: &str, notes: &TransactionNotes) -> Result<BillingSetup> {
        let result = self.configure(transaction_uuid, notes).await;
        if let Err(e) = &result {
            tracing::error!("while configuring transaction {} for payment: {}", transaction_uuid, e);
        }
        result
    }

    async fn configure(&self, transaction_uuid: &str, notes: &TransactionNotes) -> Result<BillingSetup> {
        let missing = |field: &'static str| PayError::MissingNotes {
            transaction_uuid: transaction_uuid.to_string(),
            field,
        };
        let issuer_key = notes.issuer_key.as_deref().ok_or_else(|| missing("issuer_key"))?;
        let pay = notes.pay_request.as_ref().ok_or_else(|| missing("pay_request"))?;

        let seller_uuid = get_seller_uuid(issuer_key, pay, &self.settings.marketplace_key)?;

        let tier = pay.price_point().ok_or_else(|| missing("request.pricePoint"))?;
        let prices = self.pricing.get_price(&tier).await?;
        tracing::debug!("pricePoint={} prices={:?}", tier, prices.prices);

        let product_id = pay.product_id().ok_or_else(|| missing("request.id"))?;
        let product_name = pay.name().ok_or_else(|| missing("request.name"))?;

        let seller = self
            .billing
            .get_seller(&seller_uuid)
            .await?
            .ok_or_else(|| PayError::SellerNotConfigured(seller_uuid.clone()))?;

        let product = self.bango_product(&seller, product_id, product_name).await?;

        let billing = self
            .billing
            .create_billing(&BillingRequest {
                page_title: product_name.to_string(),
                prices: prices.prices,
                transaction_uuid: transaction_uuid.to_string(),
                seller_product_bango: product.resource_uri.clone(),
                redirect_url_onsuccess: self.settings.success_redirect_url.clone(),
                redirect_url_onerror: self.settings.error_redirect_url.clone(),
            })
            .await?;
        let bill_id = billing.bill_id();

        self.billing
            .create_transaction(&NewTransaction {
                provider: PROVIDER_BANGO,
                seller_product: product.seller_product.clone(),
                source: "webpay".to_string(),
                status: TransactionStatus::Pending,
                kind: TransactionType::Payment,
                uuid: transaction_uuid.to_string(),
                uid_pay: bill_id.clone(),
            })
            .await?;

        tracing::info!(
            "transaction {} configured for billing: bill_id={} seller={}",
            transaction_uuid,
            bill_id,
            seller.uuid
        );

        Ok(BillingSetup {
            bill_id,
            seller_id: seller.resource_pk,
        })
    }

    async fn bango_product(&self, seller: &Seller, product_id: &str, name: &str) -> Result<BangoProduct> {
        if let Some(existing) = self
            .billing
            .get_bango_product(seller.resource_pk, product_id)
            .await?
        {
            return Ok(existing);
        }
        self.billing.create_bango_product(seller, product_id, name).await
    }
}

/// Seller behind a pay request. Apps sign with their own key, which is the
/// seller uuid. The marketplace signs for the apps it sells and names the
/// real seller in `productData` as `seller_uuid=...`.
pub fn get_seller_uuid(issuer_key: &str, pay: &PayRequest, marketplace_key: &str) -> Result<String> {
    if issuer_key != marketplace_key {
        return Ok(issuer_key.to_string());
    }

    let product_data = pay.product_data().unwrap_or("");
    let seller_uuid = url::form_urlencoded::parse(product_data.as_bytes())
        .find(|(k, v)| k == "seller_uuid" && !v.is_empty())
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| PayError::MissingSellerUuid {
            issuer_key: issuer_key.to_string(),
            product_data: product_data.to_string(),
        })?;

    tracing::info!(
        "using real seller_uuid {} for marketplace {} app payment",
        seller_uuid,
        marketplace_key
    );
    Ok(seller_uuid)
}
