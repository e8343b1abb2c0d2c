#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use webpay::clients::{
    BangoProduct, BillingApi, BillingConfig, BillingRequest, NewTransaction, Price, PriceTier,
    PricingApi, Seller, SellerBango,
};
use webpay::domain::notice::{Notice, NoticeOutcome};
use webpay::domain::pay_request::PayRequest;
use webpay::domain::task::Task;
use webpay::domain::transaction::{Transaction, TransactionNotes, TransactionStatus, TransactionType};
use webpay::error::PayError;
use webpay::repo::notice_repo::NoticeStore;
use webpay::repo::task_queue_repo::TaskQueue;
use webpay::service::notice_sender::NoticeSender;
use webpay::service::notify_service::{NotifyService, NotifySettings};
use webpay::service::pay_service::{PayService, PaySettings};
use webpay::service::task_retry::RetryPolicy;

pub const TRANS_UUID: &str = "some:uuid";
pub const NOTIFY_ISSUER: &str = "marketplace.firefox.com";
pub const MARKETPLACE_KEY: &str = "marketplace-domain";

#[derive(Default)]
pub struct InMemoryNotices {
    rows: Mutex<Vec<Notice>>,
}

impl InMemoryNotices {
    pub fn all(&self) -> Vec<Notice> {
        self.rows.lock().unwrap().clone()
    }

    /// The single stored notice; panics when there are zero or several.
    pub fn get(&self) -> Notice {
        let rows = self.all();
        assert_eq!(rows.len(), 1, "expected exactly one notice, got {rows:?}");
        rows[0].clone()
    }
}

#[async_trait::async_trait]
impl NoticeStore for InMemoryNotices {
    async fn record(&self, outcome: NoticeOutcome) -> Result<Notice> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = rows
            .iter_mut()
            .find(|n| n.transaction_uuid == outcome.transaction_uuid && n.url == outcome.url)
        {
            existing.success = outcome.success;
            existing.last_error = outcome.last_error;
            existing.modified_at = now;
            return Ok(existing.clone());
        }
        let notice = Notice {
            id: rows.len() as i64 + 1,
            transaction_uuid: outcome.transaction_uuid,
            url: outcome.url,
            success: outcome.success,
            last_error: outcome.last_error,
            created_at: now,
            modified_at: now,
        };
        rows.push(notice.clone());
        Ok(notice)
    }

    async fn list_for_transaction(&self, transaction_uuid: &str) -> Result<Vec<Notice>> {
        Ok(self
            .all()
            .into_iter()
            .filter(|n| n.transaction_uuid == transaction_uuid)
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingQueue {
    pub queued: Mutex<Vec<(Task, i32, DateTime<Utc>)>>,
    pub fail: bool,
}

impl RecordingQueue {
    pub fn queued(&self) -> Vec<(Task, i32, DateTime<Utc>)> {
        self.queued.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TaskQueue for RecordingQueue {
    async fn enqueue(&self, task: &Task, attempts: i32, run_at: DateTime<Utc>) -> Result<i64> {
        if self.fail {
            anyhow::bail!("queue unavailable");
        }
        let mut queued = self.queued.lock().unwrap();
        queued.push((task.clone(), attempts, run_at));
        Ok(queued.len() as i64)
    }

    async fn pending_count(&self) -> Result<i64> {
        if self.fail {
            anyhow::bail!("queue unavailable");
        }
        Ok(self.queued.lock().unwrap().len() as i64)
    }
}

/// Stand-in for solitude that serves canned objects and records writes.
pub struct FakeBilling {
    pub transaction: Mutex<Option<Transaction>>,
    pub secrets: HashMap<String, String>,
    pub sellers: HashMap<String, Seller>,
    pub product: Option<BangoProduct>,
    pub bill_id: serde_json::Value,
    pub seller_lookups: Mutex<Vec<String>>,
    pub created_products: Mutex<Vec<(String, String)>>,
    pub billing_requests: Mutex<Vec<BillingRequest>>,
    pub created_transactions: Mutex<Vec<NewTransaction>>,
}

impl Default for FakeBilling {
    fn default() -> Self {
        Self {
            transaction: Mutex::new(None),
            secrets: HashMap::new(),
            sellers: HashMap::new(),
            product: None,
            bill_id: json!(123),
            seller_lookups: Mutex::new(Vec::new()),
            created_products: Mutex::new(Vec::new()),
            billing_requests: Mutex::new(Vec::new()),
            created_transactions: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBilling {
    pub fn with_secret(mut self, public_id: &str, secret: &str) -> Self {
        self.secrets.insert(public_id.to_string(), secret.to_string());
        self
    }

    pub fn with_transaction(self, trans: Transaction) -> Self {
        *self.transaction.lock().unwrap() = Some(trans);
        self
    }

    /// A seller registered with bango, able to get new products.
    pub fn with_seller(self, uuid: &str, pk: i64) -> Self {
        let bango = SellerBango {
            resource_uri: format!("/bango/seller/{pk}/"),
            package_id: Some(json!(100)),
        };
        self.insert_seller(uuid, pk, Some(bango))
    }

    pub fn with_unregistered_seller(self, uuid: &str, pk: i64) -> Self {
        self.insert_seller(uuid, pk, None)
    }

    fn insert_seller(mut self, uuid: &str, pk: i64, bango: Option<SellerBango>) -> Self {
        self.sellers.insert(
            uuid.to_string(),
            Seller {
                resource_pk: pk,
                uuid: uuid.to_string(),
                resource_uri: Some(format!("/generic/seller/{pk}/")),
                bango,
            },
        );
        self
    }

    pub fn with_product(mut self, product: BangoProduct) -> Self {
        self.product = Some(product);
        self
    }
}

#[async_trait::async_trait]
impl BillingApi for FakeBilling {
    async fn get_transaction(&self, uuid: &str) -> Result<Transaction> {
        self.transaction
            .lock()
            .unwrap()
            .clone()
            .filter(|t| t.uuid == uuid)
            .ok_or_else(|| PayError::TransactionNotFound(uuid.to_string()).into())
    }

    async fn get_secret(&self, public_id: &str) -> Result<String> {
        self.secrets
            .get(public_id)
            .cloned()
            .ok_or_else(|| PayError::ProductNotFound(public_id.to_string()).into())
    }

    async fn get_seller(&self, uuid: &str) -> Result<Option<Seller>> {
        self.seller_lookups.lock().unwrap().push(uuid.to_string());
        Ok(self.sellers.get(uuid).cloned())
    }

    async fn get_bango_product(&self, _seller_id: i64, _external_id: &str) -> Result<Option<BangoProduct>> {
        Ok(self.product.clone())
    }

    async fn create_bango_product(&self, seller: &Seller, external_id: &str, _name: &str) -> Result<BangoProduct> {
        if seller.bango.is_none() {
            return Err(PayError::SellerNotConfigured(seller.uuid.clone()).into());
        }
        self.created_products
            .lock()
            .unwrap()
            .push((seller.uuid.clone(), external_id.to_string()));
        Ok(BangoProduct {
            resource_pk: 99,
            resource_uri: "/bango/product/99/".to_string(),
            bango_id: None,
            seller_product: Some("/generic/product/99/".to_string()),
        })
    }

    async fn create_billing(&self, request: &BillingRequest) -> Result<BillingConfig> {
        self.billing_requests.lock().unwrap().push(request.clone());
        Ok(BillingConfig {
            billing_configuration_id: self.bill_id.clone(),
            response_code: Some("OK".to_string()),
            response_message: Some("Success".to_string()),
            resource_uri: Some("/bango/billing/3333/".to_string()),
        })
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<()> {
        self.created_transactions.lock().unwrap().push(transaction.clone());
        Ok(())
    }
}

pub struct FakePricing {
    pub tier: Option<PriceTier>,
}

impl FakePricing {
    pub fn eur() -> Self {
        Self {
            tier: Some(PriceTier {
                prices: vec![Price {
                    amount: json!(1),
                    currency: "EUR".to_string(),
                }],
            }),
        }
    }

    pub fn unknown() -> Self {
        Self { tier: None }
    }
}

#[async_trait::async_trait]
impl PricingApi for FakePricing {
    async fn get_price(&self, tier: &str) -> Result<PriceTier> {
        self.tier
            .clone()
            .ok_or_else(|| PayError::TierNotFound(tier.to_string()).into())
    }
}

/// An app's original pay request, pointed at `base` for callbacks.
pub fn pay_request(typ: &str, base: &str) -> PayRequest {
    serde_json::from_value(json!({
        "iss": "k",
        "aud": NOTIFY_ISSUER,
        "typ": typ,
        "iat": 1_700_000_000,
        "exp": 1_700_003_600,
        "request": {
            "pricePoint": 1,
            "id": "generated-product-uuid",
            "name": "Some App",
            "description": "fantastic",
            "productdata": "my_product_id=1234",
            "postbackURL": format!("{base}/post"),
            "chargebackURL": format!("{base}/charge")
        }
    }))
    .unwrap()
}

pub fn transaction(kind: TransactionType, pay: PayRequest) -> Transaction {
    Transaction {
        uuid: TRANS_UUID.to_string(),
        status: TransactionStatus::Completed,
        kind,
        notes: TransactionNotes {
            issuer_key: Some("k".to_string()),
            pay_request: Some(pay),
        },
        resource_pk: None,
    }
}

pub struct NotifyHarness {
    pub service: NotifyService,
    pub notices: Arc<InMemoryNotices>,
    pub queue: Arc<RecordingQueue>,
}

pub fn notify_harness(billing: FakeBilling, timeout: Duration) -> NotifyHarness {
    notify_harness_with_queue(billing, timeout, RecordingQueue::default())
}

pub fn notify_harness_with_queue(billing: FakeBilling, timeout: Duration, queue: RecordingQueue) -> NotifyHarness {
    let notices = Arc::new(InMemoryNotices::default());
    let queue = Arc::new(queue);
    let service = NotifyService {
        billing: Arc::new(billing),
        notices: notices.clone(),
        queue: queue.clone(),
        sender: NoticeSender {
            client: reqwest::Client::new(),
            timeout,
        },
        retry_policy: RetryPolicy::default(),
        settings: NotifySettings {
            issuer: NOTIFY_ISSUER.to_string(),
            marketplace_key: MARKETPLACE_KEY.to_string(),
            marketplace_secret: "marketplace-secret".to_string(),
            expiry_secs: 3600,
        },
    };
    NotifyHarness {
        service,
        notices,
        queue,
    }
}

pub fn pay_service(billing: Arc<FakeBilling>, pricing: FakePricing) -> PayService {
    PayService {
        billing,
        pricing: Arc::new(pricing),
        settings: PaySettings {
            marketplace_key: MARKETPLACE_KEY.to_string(),
            success_redirect_url: "http://localhost:3000/bango/success".to_string(),
            error_redirect_url: "http://localhost:3000/bango/error".to_string(),
        },
    }
}
