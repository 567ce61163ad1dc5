use super::allocator::IdAllocator;
use crate::domain::amount::Amount;
use crate::domain::file_ref::object_key;
use crate::domain::job::{FulfillmentMode, Job, JobId, PaymentStatus, PrintStatus};
use crate::domain::ports::{FileStore, JobStore};
use crate::error::{PrintQError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const DEFAULT_COLOR_MODE: &str = "bw";

/// One uploaded file of a submission.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw submission fields, as loosely typed as the form they come from.
#[derive(Debug, Clone, Default)]
pub struct JobSubmission {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub page_count: Option<String>,
    pub copy_count: Option<String>,
    pub color_mode: Option<String>,
    pub fulfillment_mode: Option<String>,
    pub location: Option<String>,
    pub amount: Option<Decimal>,
    pub files: Vec<FileUpload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub job_id: JobId,
    pub amount: Amount,
    pub record_id: String,
}

/// Positive integer, or 1 for anything absent or unusable.
pub fn parse_count(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Creates a job from a submission: validate, allocate an id, upload the
/// files under that id, then write the record with initial statuses.
pub async fn submit(
    store: &dyn JobStore,
    files: &dyn FileStore,
    allocator: &IdAllocator,
    submission: JobSubmission,
) -> Result<SubmissionReceipt> {
    if submission.files.is_empty() {
        return Err(PrintQError::InvalidRequest(
            "at least one file is required".to_string(),
        ));
    }
    let customer_name = non_blank(submission.customer_name.as_deref())
        .ok_or_else(|| PrintQError::InvalidRequest("customer name is required".to_string()))?;
    let customer_phone = non_blank(submission.customer_phone.as_deref())
        .ok_or_else(|| PrintQError::InvalidRequest("customer phone is required".to_string()))?;
    let amount_due = match submission.amount {
        Some(value) => Amount::new(value)?,
        None => Amount::ZERO,
    };

    let job_id = allocator.allocate(store).await?;
    let created_at = Utc::now();

    let mut file_refs = Vec::with_capacity(submission.files.len());
    for upload in submission.files {
        let key = object_key(&job_id, &upload.file_name, created_at);
        let reference = files
            .put(&key, upload.content_type.as_deref(), upload.bytes)
            .await
            .inspect_err(|e| tracing::error!(%job_id, %key, error = %e, "file upload failed"))?;
        file_refs.push(reference);
    }

    let job = Job {
        job_id: job_id.clone(),
        customer_name,
        customer_phone,
        page_count: parse_count(submission.page_count.as_deref()),
        copy_count: parse_count(submission.copy_count.as_deref()),
        color_mode: non_blank(submission.color_mode.as_deref())
            .unwrap_or_else(|| DEFAULT_COLOR_MODE.to_string()),
        fulfillment_mode: FulfillmentMode::from_input(submission.fulfillment_mode.as_deref()),
        location: non_blank(submission.location.as_deref()),
        file_refs,
        amount_due,
        payment_status: PaymentStatus::Unpaid,
        print_status: PrintStatus::Pending,
        print_code: None,
        notification: None,
        checkout_url: None,
        created_at,
    };

    let uploaded = job.file_refs.clone();
    let stored = store.create(job).await.inspect_err(|e| {
        tracing::error!(
            %job_id,
            orphaned = ?uploaded,
            error = %e,
            "failed to create job record, uploaded files are orphaned"
        )
    })?;

    tracing::info!(
        %job_id,
        record_id = %stored.record_id,
        files = stored.job.file_refs.len(),
        "job submitted"
    );
    Ok(SubmissionReceipt {
        job_id,
        amount: stored.job.amount_due,
        record_id: stored.record_id,
    })
}
