use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    RequestException,
    HttpError,
    InvalidResponse,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "Timeout",
            FailureKind::RequestException => "RequestException",
            FailureKind::HttpError => "HTTPError",
            FailureKind::InvalidResponse => "InvalidResponse",
        }
    }

    /// Transport and status failures are worth another attempt; an app that
    /// answered with the wrong body will answer the same way again.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FailureKind::InvalidResponse)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendResult {
    pub success: bool,
    pub last_error: String,
    pub failure: Option<FailureKind>,
}

impl SendResult {
    fn ok() -> Self {
        Self {
            success: true,
            last_error: String::new(),
            failure: None,
        }
    }

    fn failed(kind: FailureKind, detail: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            last_error: format!("{}: {}", kind.label(), detail),
            failure: Some(kind),
        }
    }

    pub fn should_retry(&self) -> bool {
        self.failure.is_some_and(|k| k.is_transient())
    }
}

#[derive(Clone)]
pub struct NoticeSender {
    pub client: reqwest::Client,
    pub timeout: Duration,
}

impl NoticeSender {
    /// POSTs the signed notice. The app acknowledges by answering with the
    /// transaction uuid as the whole body.
    pub async fn send(&self, url: &str, signed_notice: &str, transaction_uuid: &str) -> SendResult {
        let resp = self
            .client
            .post(url)
            .body(signed_notice.to_string())
            .timeout(self.timeout)
            .send()
            .await;

        let result = match resp {
            Err(e) => SendResult::failed(transport_failure(&e), &e),
            Ok(r) => {
                let status = r.status();
                match r.error_for_status() {
                    Err(e) => SendResult::failed(FailureKind::HttpError, format!("{status} {e}")),
                    Ok(r) => match r.text().await {
                        Err(e) => SendResult::failed(transport_failure(&e), &e),
                        Ok(body) => classify_body(&body, transaction_uuid),
                    },
                }
            }
        };

        if result.success {
            tracing::debug!("url {} responded OK for transaction {} notice", url, transaction_uuid);
        } else {
            tracing::error!(
                "notice for transaction {} to url {} failed: {}",
                transaction_uuid,
                url,
                result.last_error
            );
        }
        result
    }
}

pub fn classify_body(body: &str, transaction_uuid: &str) -> SendResult {
    if body == transaction_uuid {
        SendResult::ok()
    } else {
        let got: String = body.chars().take(200).collect();
        SendResult::failed(
            FailureKind::InvalidResponse,
            format!("did not respond with transaction ID {transaction_uuid}; got {got:?}"),
        )
    }
}

fn transport_failure(e: &reqwest::Error) -> FailureKind {
    if e.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::RequestException
    }
}
