//! Notification tokens sent to app callback URLs.
//!
//! Tokens are HS256 JWTs signed with the app's secret. The `request` claim is
//! the app's original pay request, so apps can match the notice against what
//! they asked for.

use crate::domain::notice::{ChargebackReason, NoticeType};
use anyhow::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeResponse {
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ChargebackReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeClaims {
    pub iss: String,
    pub aud: String,
    pub typ: String,
    pub iat: i64,
    pub exp: i64,
    pub request: serde_json::Value,
    pub response: NoticeResponse,
}

pub struct NoticeParams<'a> {
    pub issuer: &'a str,
    pub audience: &'a str,
    pub notice_type: NoticeType,
    pub transaction_uuid: &'a str,
    pub request: &'a serde_json::Value,
    pub expiry_secs: i64,
}

pub fn build_claims(params: &NoticeParams<'_>, now: i64) -> NoticeClaims {
    NoticeClaims {
        iss: params.issuer.to_string(),
        aud: params.audience.to_string(),
        typ: params.notice_type.typ().to_string(),
        iat: now,
        exp: now + params.expiry_secs,
        request: params.request.clone(),
        response: NoticeResponse {
            transaction_id: params.transaction_uuid.to_string(),
            reason: params.notice_type.reason(),
        },
    }
}

pub fn sign_notice(claims: &NoticeClaims, secret: &str) -> Result<String> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Checks signature, issuer, audience and expiry.
pub fn verify_notice(token: &str, secret: &str, issuer: &str, audience: &str) -> Result<NoticeClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);
    let data = decode::<NoticeClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notice::{TYP_CHARGEBACK, TYP_POSTBACK};
    use serde_json::json;

    fn params<'a>(notice_type: NoticeType, request: &'a serde_json::Value) -> NoticeParams<'a> {
        NoticeParams {
            issuer: "marketplace.firefox.com",
            audience: "k",
            notice_type,
            transaction_uuid: "some:uuid",
            request,
            expiry_secs: 3600,
        }
    }

    #[test]
    fn postback_round_trips_through_secret() {
        let request = json!({"pricePoint": 1, "name": "Some App"});
        let now = chrono::Utc::now().timestamp();
        let claims = build_claims(&params(NoticeType::Postback, &request), now);
        let token = sign_notice(&claims, "f").unwrap();

        let decoded = verify_notice(&token, "f", "marketplace.firefox.com", "k").unwrap();
        assert_eq!(decoded.typ, TYP_POSTBACK);
        assert_eq!(decoded.request, request);
        assert_eq!(decoded.response.transaction_id, "some:uuid");
        assert_eq!(decoded.response.reason, None);
        assert_eq!(decoded.exp - decoded.iat, 3600);
    }

    #[test]
    fn chargeback_carries_reason() {
        let request = json!({});
        let claims = build_claims(
            &params(NoticeType::Chargeback(ChargebackReason::Refund), &request),
            chrono::Utc::now().timestamp(),
        );
        assert_eq!(claims.typ, TYP_CHARGEBACK);
        let v = serde_json::to_value(&claims).unwrap();
        assert_eq!(v["response"]["reason"], "refund");
        assert_eq!(v["response"]["transactionID"], "some:uuid");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let request = json!({});
        let claims = build_claims(&params(NoticeType::Postback, &request), chrono::Utc::now().timestamp());
        let token = sign_notice(&claims, "f").unwrap();
        assert!(verify_notice(&token, "not-f", "marketplace.firefox.com", "k").is_err());
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let request = json!({});
        let claims = build_claims(&params(NoticeType::Postback, &request), chrono::Utc::now().timestamp());
        let token = sign_notice(&claims, "f").unwrap();
        assert!(verify_notice(&token, "f", "marketplace.firefox.com", "other").is_err());
    }
}
