use super::job::{Job, JobId, JobUpdate, StoredJob};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Record store holding one document per job.
///
/// Every call touches a single record. Callers must not assume
/// read-after-write consistency across replicas.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Adds a record. An existing record with the same job id is kept.
    async fn create(&self, job: Job) -> Result<StoredJob>;
    /// The newest record for `job_id`.
    async fn find_by_job_id(&self, job_id: &JobId) -> Result<Option<Job>>;
    /// Patches the newest record for `job_id`. Fields the patch leaves unset
    /// are never written back from a stale read.
    async fn update(&self, job_id: &JobId, update: JobUpdate) -> Result<()>;
    async fn all_jobs(&self) -> Result<Vec<Job>>;
}

/// Object storage for uploaded print files.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the reference to keep on the job.
    async fn put(&self, key: &str, content_type: Option<&str>, bytes: Vec<u8>) -> Result<String>;
}

/// Gateway-neutral description of a checkout session to open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRequest {
    pub job_id: JobId,
    /// Amount in the gateway's minor unit.
    pub amount_minor: i64,
    pub email: String,
    pub description: String,
    pub line_item_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub session_id: Option<String>,
    pub checkout_url: Option<String>,
}

/// Outbound checkout-session API of the payment gateway.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;
}

pub type JobStoreBox = Box<dyn JobStore>;
pub type FileStoreBox = Box<dyn FileStore>;
pub type CheckoutGatewayBox = Box<dyn CheckoutGateway>;
