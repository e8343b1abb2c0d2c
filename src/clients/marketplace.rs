use crate::clients::{PriceTier, PricingApi};
use crate::error::{api_error, PayError};
use anyhow::Result;
use reqwest::StatusCode;
use std::time::Duration;

pub struct MarketplaceClient {
    pub base_url: String,
    pub timeout: Duration,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl PricingApi for MarketplaceClient {
    async fn get_price(&self, tier: &str) -> Result<PriceTier> {
        let url = format!(
            "{}/api/webpay/prices/{}/",
            self.base_url.trim_end_matches('/'),
            tier
        );

        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| api_error("marketplace", e.to_string()))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(PayError::TierNotFound(tier.to_string()).into()),
            s if s.is_success() => resp
                .json::<PriceTier>()
                .await
                .map_err(|e| api_error("marketplace", format!("invalid price tier body: {e}"))),
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(api_error(
                    "marketplace",
                    format!("price lookup returned {}: {}", s.as_u16(), body.chars().take(200).collect::<String>()),
                ))
            }
        }
    }
}
