//! PayMongo checkout-session integration over its REST API.

use crate::config::GatewayConfig;
use crate::domain::ports::{CheckoutGateway, CheckoutRequest, CheckoutSession};
use crate::error::{PrintQError, Result};
use async_trait::async_trait;
use serde_json::{Value, json};

pub struct PayMongoGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl PayMongoGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_client(client: reqwest::Client, config: GatewayConfig) -> Self {
        Self { client, config }
    }
}

/// Request body for `POST /checkout_sessions`.
pub fn checkout_payload(request: &CheckoutRequest, config: &GatewayConfig) -> Value {
    let mut attributes = json!({
        "billing": { "email": request.email },
        "line_items": [{
            "name": request.line_item_name,
            "amount": request.amount_minor,
            "currency": config.currency,
            "quantity": 1
        }],
        "payment_method_types": config.payment_method_types,
        "description": request.description,
        "reference_number": request.job_id,
        "metadata": { "jobId": request.job_id },
        "send_email_receipt": true,
        "show_description": true,
        "show_line_items": true
    });

    if let Some(url) = &config.success_url {
        attributes["success_url"] = json!(url);
    }
    if let Some(url) = &config.cancel_url {
        attributes["cancel_url"] = json!(url);
    }

    json!({ "data": { "attributes": attributes } })
}

/// Pulls the session id and hosted checkout URL out of a create response.
pub fn parse_checkout_response(body: &Value) -> CheckoutSession {
    let data = &body["data"];
    CheckoutSession {
        session_id: data["id"].as_str().map(String::from),
        checkout_url: data["attributes"]["checkout_url"]
            .as_str()
            .filter(|url| !url.is_empty())
            .map(String::from),
    }
}

#[async_trait]
impl CheckoutGateway for PayMongoGateway {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let url = format!("{}/checkout_sessions", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .json(&checkout_payload(request, &self.config))
            .send()
            .await
            .map_err(|e| PrintQError::GatewayError(format!("request failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| PrintQError::GatewayError(format!("unreadable response ({status}): {e}")))?;

        if !status.is_success() {
            let detail = body["errors"][0]["detail"].as_str().unwrap_or("no detail");
            return Err(PrintQError::GatewayError(format!(
                "checkout rejected with {status}: {detail}"
            )));
        }

        Ok(parse_checkout_response(&body))
    }
}
