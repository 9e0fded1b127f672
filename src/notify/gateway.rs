use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{config::SmsConfig, error::AppError};

/// What the provider answered for an accepted message.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub body: serde_json::Value,
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn deliver(&self, to: &str, message: &str) -> Result<DeliveryReceipt, AppError>;
}

/// Form-encoded messaging API authenticated with an `apiKey` header.
#[derive(Debug, Clone)]
pub struct HttpSmsGateway {
    client: Client,
    options: SmsConfig,
}

impl HttpSmsGateway {
    pub fn new(options: SmsConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs.max(1)))
            .build()?;
        Ok(Self { client, options })
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn deliver(&self, to: &str, message: &str) -> Result<DeliveryReceipt, AppError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("username", self.options.username.as_str()),
            ("to", to),
            ("message", message),
        ];
        if let Some(from) = self.options.sender_id.as_deref() {
            form.push(("from", from));
        }

        let res = self
            .client
            .post(&self.options.api_url)
            .header("apiKey", &self.options.api_key)
            .header(header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("request failed: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| AppError::Gateway(format!("reading response failed: {e}")))?;

        if !status.is_success() {
            warn!(%status, "sms provider rejected message");
            return Err(AppError::Gateway(format!("provider returned {status}: {text}")));
        }

        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        debug!(%status, "sms provider accepted message");
        Ok(DeliveryReceipt {
            status: status.as_u16(),
            body,
        })
    }
}

/// Stands in when no provider credentials are configured.
#[derive(Debug, Clone, Copy)]
pub struct UnconfiguredGateway;

#[async_trait]
impl SmsGateway for UnconfiguredGateway {
    async fn deliver(&self, _to: &str, _message: &str) -> Result<DeliveryReceipt, AppError> {
        Err(AppError::Gateway("sms gateway not configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::post,
        Form, Json, Router,
    };
    use std::collections::HashMap;

    async fn provider() -> String {
        async fn accept(
            headers: HeaderMap,
            Form(form): Form<HashMap<String, String>>,
        ) -> (StatusCode, Json<serde_json::Value>) {
            if headers.get("apiKey").and_then(|v| v.to_str().ok()) != Some("key-1") {
                return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({"error": "bad key"})));
            }
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "to": form.get("to"),
                    "message": form.get("message"),
                    "username": form.get("username"),
                    "from": form.get("from"),
                })),
            )
        }
        async fn slow() -> &'static str {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }

        let app = Router::new()
            .route("/messaging", post(accept))
            .route("/slow", post(slow));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn options(base: &str, path: &str, key: &str) -> SmsConfig {
        SmsConfig {
            api_url: format!("{base}{path}"),
            username: "sandbox".into(),
            api_key: key.into(),
            sender_id: Some("REMIND".into()),
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn posts_form_and_returns_provider_body() {
        let base = provider().await;
        let gateway = HttpSmsGateway::new(options(&base, "/messaging", "key-1")).unwrap();
        let receipt = gateway.deliver("+254700000000", "Exam at 09:00").await.unwrap();
        assert_eq!(receipt.status, 201);
        assert_eq!(receipt.body["to"], "+254700000000");
        assert_eq!(receipt.body["message"], "Exam at 09:00");
        assert_eq!(receipt.body["username"], "sandbox");
        assert_eq!(receipt.body["from"], "REMIND");
    }

    #[tokio::test]
    async fn provider_rejection_is_a_gateway_error() {
        let base = provider().await;
        let gateway = HttpSmsGateway::new(options(&base, "/messaging", "wrong")).unwrap();
        let err = gateway.deliver("+254700000000", "hi").await.unwrap_err();
        assert!(matches!(err, AppError::Gateway(_)));
    }

    #[tokio::test]
    async fn hung_provider_times_out() {
        let base = provider().await;
        let gateway = HttpSmsGateway::new(options(&base, "/slow", "key-1")).unwrap();
        let started = std::time::Instant::now();
        let err = gateway.deliver("+254700000000", "hi").await.unwrap_err();
        assert!(matches!(err, AppError::Gateway(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn unconfigured_gateway_always_fails() {
        let err = UnconfiguredGateway.deliver("+1", "hi").await.unwrap_err();
        assert!(matches!(err, AppError::Gateway(_)));
    }
}
