use super::locks::KeyedLocks;
use crate::domain::event::{GatewayEvent, IgnoreReason, PaymentOutcome};
use crate::domain::job::{Job, JobId, JobUpdate, PaymentStatus, PrintStatus};
use crate::domain::ports::JobStore;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

const PRINT_CODE_PLACEHOLDER: &str = "CUSTOMER";

/// Response to a webhook delivery. Both variants are acknowledgements; only
/// an `Err` from [`WebhookReconciler::reconcile`] asks the gateway to retry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WebhookAck {
    #[serde(rename_all = "camelCase")]
    Applied {
        job_id: JobId,
        outcome: PaymentOutcome,
        payment_status: PaymentStatus,
        print_status: PrintStatus,
    },
    Ignored(IgnoreReason),
}

impl WebhookAck {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Display code handed to the customer: the name (whitespace runs turned
/// into `-`, upper-cased) followed by the unix time in milliseconds.
pub fn print_code(customer_name: &str, at: DateTime<Utc>) -> String {
    let name = customer_name.split_whitespace().collect::<Vec<_>>().join("-");
    let name = if name.is_empty() {
        PRINT_CODE_PLACEHOLDER.to_string()
    } else {
        name.to_uppercase()
    };
    format!("{name}-{}", at.timestamp_millis())
}

/// The four status fields written for an outcome, as one patch.
pub fn transition(job: &Job, outcome: PaymentOutcome, at: DateTime<Utc>) -> JobUpdate {
    let code = Some(Some(print_code(&job.customer_name, at)));
    match outcome {
        PaymentOutcome::Paid => JobUpdate {
            payment_status: Some(PaymentStatus::Paid),
            print_status: Some(PrintStatus::Approved),
            print_code: code,
            notification: Some(Some(
                job.fulfillment_mode.paid_notification().to_string(),
            )),
            checkout_url: None,
        },
        PaymentOutcome::Rejected => JobUpdate {
            payment_status: Some(PaymentStatus::Unpaid),
            print_status: Some(PrintStatus::Rejected),
            print_code: code,
            notification: Some(None),
            checkout_url: None,
        },
    }
}

/// Applies payment events to jobs.
///
/// Only `(Unpaid, Pending)` jobs move. Everything that cannot or should not
/// be applied is acknowledged as ignored so the gateway stops retrying it.
/// Events for the same job id are serialized on this instance.
#[derive(Default)]
pub struct WebhookReconciler {
    locks: KeyedLocks,
}

impl WebhookReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reconcile(&self, store: &dyn JobStore, event: &GatewayEvent) -> Result<WebhookAck> {
        let (job_id, outcome) = match event.interpret() {
            Ok(interpreted) => interpreted,
            Err(reason) => {
                tracing::info!(?reason, "ignoring webhook event");
                return Ok(WebhookAck::Ignored(reason));
            }
        };

        let _guard = self.locks.lock(job_id.as_str()).await;

        let job = match store.find_by_job_id(&job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::warn!(%job_id, "webhook references unknown job");
                return Ok(WebhookAck::Ignored(IgnoreReason::UnknownJob { job_id }));
            }
            Err(e) => {
                tracing::error!(%job_id, error = %e, "failed to load job for reconciliation");
                return Err(e);
            }
        };

        if !job.awaiting_payment() {
            tracing::info!(
                %job_id,
                payment_status = ?job.payment_status,
                print_status = ?job.print_status,
                "job already settled, ignoring replayed event"
            );
            return Ok(WebhookAck::Ignored(IgnoreReason::AlreadySettled { job_id }));
        }

        let update = transition(&job, outcome, Utc::now());
        let (payment_status, print_status) = (
            update.payment_status.unwrap_or(job.payment_status),
            update.print_status.unwrap_or(job.print_status),
        );

        if let Err(e) = store.update(&job_id, update).await {
            tracing::error!(%job_id, ?outcome, error = %e, "failed to apply payment outcome");
            return Err(e);
        }

        tracing::info!(%job_id, ?outcome, "payment reconciled");
        Ok(WebhookAck::Applied {
            job_id,
            outcome,
            payment_status,
            print_status,
        })
    }
}
