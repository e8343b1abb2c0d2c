use crate::clients::{
    BangoProduct, BillingApi, BillingConfig, BillingRequest, ListResponse, NewTransaction, Seller,
};
use crate::domain::transaction::Transaction;
use crate::error::{api_error, PayError};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const SERVICE: &str = "solitude";

pub struct SolitudeClient {
    pub base_url: String,
    pub timeout: Duration,
    pub client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GenericProduct {
    resource_uri: String,
    #[serde(default)]
    secret: Option<String>,
}

impl SolitudeClient {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| api_error(SERVICE, format!("GET {path}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error(
                SERVICE,
                format!("GET {path} returned {}: {}", status.as_u16(), truncate(&body)),
            ));
        }

        let page: ListResponse<T> = resp
            .json()
            .await
            .map_err(|e| api_error(SERVICE, format!("GET {path}: invalid body: {e}")))?;
        Ok(page.objects)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &serde_json::Value) -> Result<T> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| api_error(SERVICE, format!("POST {path}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error(
                SERVICE,
                format!("POST {path} returned {}: {}", status.as_u16(), truncate(&body)),
            ));
        }

        resp.json()
            .await
            .map_err(|e| api_error(SERVICE, format!("POST {path}: invalid body: {e}")))
    }
}

/// At most one object is expected back from a filtered lookup.
fn single<T>(mut objects: Vec<T>, what: &str) -> Result<Option<T>> {
    match objects.len() {
        0 => Ok(None),
        1 => Ok(objects.pop()),
        n => Err(api_error(SERVICE, format!("expected one {what}, got {n}"))),
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(200).collect()
}

#[async_trait::async_trait]
impl BillingApi for SolitudeClient {
    async fn get_transaction(&self, uuid: &str) -> Result<Transaction> {
        let found = self
            .list::<Transaction>("/generic/transaction/", &[("uuid", uuid.to_string())])
            .await?;
        single(found, "transaction")?.ok_or_else(|| PayError::TransactionNotFound(uuid.to_string()).into())
    }

    async fn get_secret(&self, public_id: &str) -> Result<String> {
        let found = self
            .list::<GenericProduct>("/generic/product/", &[("public_id", public_id.to_string())])
            .await?;
        single(found, "product")?
            .and_then(|p| p.secret)
            .ok_or_else(|| PayError::ProductNotFound(public_id.to_string()).into())
    }

    async fn get_seller(&self, uuid: &str) -> Result<Option<Seller>> {
        let found = self
            .list::<Seller>("/generic/seller/", &[("uuid", uuid.to_string())])
            .await?;
        single(found, "seller")
    }

    async fn get_bango_product(&self, seller_id: i64, external_id: &str) -> Result<Option<BangoProduct>> {
        let found = self
            .list::<BangoProduct>(
                "/bango/product/",
                &[
                    ("seller_product__seller", seller_id.to_string()),
                    ("seller_product__external_id", external_id.to_string()),
                ],
            )
            .await?;
        single(found, "bango product")
    }

    async fn create_bango_product(
        &self,
        seller: &Seller,
        external_id: &str,
        name: &str,
    ) -> Result<BangoProduct> {
        let bango = seller
            .bango
            .as_ref()
            .ok_or_else(|| PayError::SellerNotConfigured(seller.uuid.clone()))?;

        let generic: GenericProduct = self
            .post(
                "/generic/product/",
                &json!({
                    "seller": seller.uri(),
                    "external_id": external_id,
                    "public_id": uuid::Uuid::new_v4().to_string(),
                }),
            )
            .await?;

        let mut product: BangoProduct = self
            .post(
                "/bango/product/",
                &json!({
                    "seller_bango": bango.resource_uri,
                    "seller_product": generic.resource_uri,
                    "name": name,
                    "categoryId": 1,
                    "packageId": bango.package_id,
                }),
            )
            .await?;
        product.seller_product.get_or_insert(generic.resource_uri);

        tracing::info!(
            seller = %seller.uuid,
            external_id,
            product = %product.resource_uri,
            "created bango product"
        );
        Ok(product)
    }

    async fn create_billing(&self, request: &BillingRequest) -> Result<BillingConfig> {
        self.post("/bango/billing/", &serde_json::to_value(request)?).await
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<()> {
        let _: serde_json::Value = self
            .post("/generic/transaction/", &serde_json::to_value(transaction)?)
            .await?;
        Ok(())
    }
}
