use super::amount::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const JOB_ID_PREFIX: &str = "Print-";
pub const JOB_NUMBER_MIN: u16 = 1000;
pub const JOB_NUMBER_MAX: u16 = 9999;

/// Human-readable job identifier in the form `Print-NNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Builds the id for a number in `[1000, 9999]`. Out-of-range numbers are
    /// clamped, the allocator never produces them.
    pub fn from_number(number: u16) -> Self {
        let number = number.clamp(JOB_NUMBER_MIN, JOB_NUMBER_MAX);
        Self(format!("{JOB_ID_PREFIX}{number}"))
    }

    /// Parses a `Print-NNNN` string, trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.trim().strip_prefix(JOB_ID_PREFIX)?;
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let number: u16 = digits.parse().ok()?;
        (JOB_NUMBER_MIN..=JOB_NUMBER_MAX)
            .contains(&number)
            .then(|| Self(format!("{JOB_ID_PREFIX}{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrintStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// How the finished prints reach the customer. Any submitted value other than
/// `"pickup"` means delivery.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentMode {
    #[default]
    Pickup,
    Delivery,
}

impl FulfillmentMode {
    pub fn from_input(raw: Option<&str>) -> Self {
        match raw {
            Some("pickup") => Self::Pickup,
            _ => Self::Delivery,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }

    /// Customer-facing message once the job is paid.
    pub fn paid_notification(&self) -> &'static str {
        match self {
            Self::Pickup => "Ready for pickup",
            Self::Delivery => "On the way",
        }
    }
}

/// One print submission tracked through payment and fulfillment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: JobId,
    pub customer_name: String,
    pub customer_phone: String,
    pub page_count: u32,
    pub copy_count: u32,
    pub color_mode: String,
    pub fulfillment_mode: FulfillmentMode,
    pub location: Option<String>,
    /// Storage references in submission order. Never empty.
    pub file_refs: Vec<String>,
    pub amount_due: Amount,
    pub payment_status: PaymentStatus,
    pub print_status: PrintStatus,
    pub print_code: Option<String>,
    pub notification: Option<String>,
    /// Last checkout page created for this job. Informational only.
    #[serde(default)]
    pub checkout_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// True until the first successful reconciliation moves the job to a
    /// terminal state.
    pub fn awaiting_payment(&self) -> bool {
        self.payment_status == PaymentStatus::Unpaid && self.print_status == PrintStatus::Pending
    }

    /// Applies a partial update. The job id and creation time are never
    /// touched.
    pub fn apply(&mut self, update: &JobUpdate) {
        if let Some(status) = update.payment_status {
            self.payment_status = status;
        }
        if let Some(status) = update.print_status {
            self.print_status = status;
        }
        if let Some(code) = &update.print_code {
            self.print_code = code.clone();
        }
        if let Some(notification) = &update.notification {
            self.notification = notification.clone();
        }
        if let Some(url) = &update.checkout_url {
            self.checkout_url = Some(url.clone());
        }
    }
}

/// Partial-field patch for `JobStore::update`.
///
/// `None` leaves a field alone; `Some(None)` clears a nullable field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JobUpdate {
    pub payment_status: Option<PaymentStatus>,
    pub print_status: Option<PrintStatus>,
    pub print_code: Option<Option<String>>,
    pub notification: Option<Option<String>>,
    pub checkout_url: Option<String>,
}

impl JobUpdate {
    pub fn checkout_url(url: impl Into<String>) -> Self {
        Self {
            checkout_url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// A job as returned by `JobStore::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob {
    pub record_id: String,
    pub job: Job,
}

/// Externally visible status fields of a job.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub job_id: JobId,
    pub print_code: Option<String>,
    pub payment_status: PaymentStatus,
    pub print_status: PrintStatus,
    pub notification: Option<String>,
}

impl From<&Job> for StatusView {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id.clone(),
            print_code: job.print_code.clone(),
            payment_status: job.payment_status,
            print_status: job.print_status,
            notification: job.notification.clone(),
        }
    }
}
