//! # Stripe Checkout Adapter
//!
//! REST calls with form-encoded bodies and HTTP basic auth (secret key as the
//! user name), no SDK.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::webhook::{parse_event, verify_signature};
use smartsales_core::gateway::{
    CheckoutSession, GatewayError, GatewayEvent, PaymentGateway, SessionRequest, SessionStatus,
};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Placeholder the provider substitutes with the real session id on redirect.
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Credentials and redirect targets.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Overridable for tests and proxies.
    pub api_base: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        StripeGateway {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Success redirect, carrying the session id back to the frontend.
    fn success_url(&self) -> String {
        let sep = if self.config.success_url.contains('?') { '&' } else { '?' };
        format!("{}{sep}session_id={SESSION_ID_PLACEHOLDER}", self.config.success_url)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown provider error")
                .to_string();
            warn!(status = status.as_u16(), message = %message, "Stripe request rejected");
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

/// Form fields for `POST /v1/checkout/sessions`.
pub fn session_form(request: &SessionRequest, success_url: &str, cancel_url: &str) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), success_url.to_string()),
        ("cancel_url".to_string(), cancel_url.to_string()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[price_data][currency]"), request.currency.clone()));
        form.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
        if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
            form.push((
                format!("{prefix}[price_data][product_data][description]"),
                description.to_string(),
            ));
        }
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount_cents.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    if let Some(email) = &request.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }

    form
}

/// Reads the fields we use from a checkout session object.
pub fn parse_session(body: &Value) -> Result<SessionStatus, GatewayError> {
    let session_id = body["id"]
        .as_str()
        .ok_or_else(|| GatewayError::Malformed("session missing id".to_string()))?
        .to_string();

    // payment_intent is an id unless expanded into an object
    let payment_intent_id = match &body["payment_intent"] {
        Value::String(id) => Some(id.clone()),
        Value::Object(obj) => obj.get("id").and_then(Value::as_str).map(String::from),
        _ => None,
    };

    Ok(SessionStatus {
        session_id,
        payment_status: body["payment_status"].as_str().unwrap_or("unpaid").to_string(),
        payment_intent_id,
        amount_total_cents: body["amount_total"].as_i64(),
        currency: body["currency"].as_str().map(String::from),
    })
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession, GatewayError> {
        let form = session_form(&request, &self.success_url(), &self.config.cancel_url);
        debug!(lines = request.line_items.len(), "Creating Stripe checkout session");

        let response = self
            .client
            .post(self.url("/v1/checkout/sessions"))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let body = Self::read_json(response).await?;

        let session_id = body["id"]
            .as_str()
            .ok_or_else(|| GatewayError::Malformed(format!("create_session: no id in {body}")))?;
        let redirect_url = body["url"]
            .as_str()
            .ok_or_else(|| GatewayError::Malformed(format!("create_session: no url in {body}")))?;

        Ok(CheckoutSession {
            session_id: session_id.to_string(),
            redirect_url: redirect_url.to_string(),
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/checkout/sessions/{session_id}")))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let body = Self::read_json(response).await?;
        parse_session(&body)
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<GatewayEvent, GatewayError> {
        verify_signature(
            payload,
            signature,
            &self.config.webhook_secret,
            chrono::Utc::now().timestamp(),
        )?;
        parse_event(payload)
    }
}
