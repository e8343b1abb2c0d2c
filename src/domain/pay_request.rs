use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JWT payload an app sent to start a payment. Only `request` is read;
/// everything else rides along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default)]
    pub request: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PayRequest {
    pub fn price_point(&self) -> Option<String> {
        match self.request.get("pricePoint")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn product_id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// `productData` as an app sends it, with the lowercase spelling accepted
    /// for older apps.
    pub fn product_data(&self) -> Option<&str> {
        self.str_field("productData").or_else(|| self.str_field("productdata"))
    }

    pub fn postback_url(&self) -> Option<&str> {
        self.str_field("postbackURL")
    }

    pub fn chargeback_url(&self) -> Option<&str> {
        self.str_field("chargebackURL")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.request.get(key).and_then(Value::as_str)
    }
}
