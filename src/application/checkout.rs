use crate::domain::amount::Amount;
use crate::domain::event::checkout_description;
use crate::domain::job::{JobId, JobUpdate};
use crate::domain::ports::{CheckoutGateway, CheckoutRequest, JobStore};
use crate::error::{PrintQError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInput {
    pub job_id: Option<String>,
    pub amount: Option<Decimal>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLink {
    pub checkout_url: String,
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PrintQError::InvalidRequest(format!("{field} is required")))
}

/// Validates the input and turns it into the gateway-neutral request.
pub fn build_request(input: &CheckoutInput) -> Result<CheckoutRequest> {
    let raw_job_id = required(input.job_id.as_deref(), "jobId")?;
    let amount = input
        .amount
        .ok_or_else(|| PrintQError::InvalidRequest("amount is required".to_string()))?;
    let email = required(input.email.as_deref(), "email")?;

    let job_id = JobId::parse(raw_job_id)
        .ok_or_else(|| PrintQError::InvalidRequest(format!("malformed jobId: {raw_job_id}")))?;
    let amount_minor = Amount::new(amount)?.to_minor_units()?;

    Ok(CheckoutRequest {
        description: checkout_description(&job_id),
        line_item_name: format!("Print Job {job_id}"),
        job_id,
        amount_minor,
        email: email.to_string(),
    })
}

/// Opens a checkout session for a job and records its URL on the job.
///
/// The URL annotation does not touch payment or print status, and a failure
/// to write it is logged rather than returned: the session already exists.
pub async fn create_checkout(
    store: &dyn JobStore,
    gateway: &dyn CheckoutGateway,
    input: &CheckoutInput,
) -> Result<CheckoutLink> {
    let request = build_request(input)?;
    let job_id = request.job_id.clone();

    let session = gateway
        .create_checkout_session(&request)
        .await
        .inspect_err(|e| tracing::error!(%job_id, error = %e, "checkout session request failed"))?;

    let Some(checkout_url) = session.checkout_url else {
        tracing::error!(%job_id, session_id = ?session.session_id, "gateway response has no checkout URL");
        return Err(PrintQError::MissingCheckoutUrl {
            job_id: job_id.to_string(),
        });
    };

    if let Err(e) = store
        .update(&job_id, JobUpdate::checkout_url(checkout_url.clone()))
        .await
    {
        tracing::warn!(%job_id, error = %e, "could not record checkout URL on job");
    }

    tracing::info!(%job_id, amount_minor = request.amount_minor, "checkout session created");
    Ok(CheckoutLink { checkout_url })
}
