use crate::domain::job::{Job, JobId, JobUpdate, StoredJob};
use crate::domain::ports::{FileStore, JobStore};
use crate::error::{PrintQError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Records {
    /// Job documents keyed by record id.
    jobs: HashMap<String, Job>,
    /// Record ids per job id, oldest first.
    index: HashMap<JobId, Vec<String>>,
}

impl Records {
    fn latest(&self, job_id: &JobId) -> Option<&Job> {
        let record_id = self.index.get(job_id)?.last()?;
        self.jobs.get(record_id)
    }

    fn latest_mut(&mut self, job_id: &JobId) -> Option<&mut Job> {
        let record_id = self.index.get(job_id)?.last()?;
        self.jobs.get_mut(record_id)
    }
}

/// A thread-safe in-memory job store.
///
/// Documents are keyed by record id, so a second job created under an id
/// already in use never replaces the first one. Lookups by job id resolve to
/// the newest record. Clones share the same records.
#[derive(Default, Clone)]
pub struct InMemoryJobStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryJobStore {
    /// Creates a new, empty in-memory job store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.jobs.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: Job) -> Result<StoredJob> {
        let record_id = Uuid::new_v4().to_string();
        let mut records = self.records.write().await;

        let ids = records.index.entry(job.job_id.clone()).or_default();
        if !ids.is_empty() {
            tracing::warn!(job_id = %job.job_id, existing = ids.len(), "job id already in use, keeping earlier records");
        }
        ids.push(record_id.clone());
        records.jobs.insert(record_id.clone(), job.clone());

        Ok(StoredJob { record_id, job })
    }

    async fn find_by_job_id(&self, job_id: &JobId) -> Result<Option<Job>> {
        let records = self.records.read().await;
        Ok(records.latest(job_id).cloned())
    }

    async fn update(&self, job_id: &JobId, update: JobUpdate) -> Result<()> {
        let mut records = self.records.write().await;
        match records.latest_mut(job_id) {
            Some(job) => {
                job.apply(&update);
                Ok(())
            }
            None => Err(PrintQError::store_write(job_id.as_str(), "no such job record")),
        }
    }

    async fn all_jobs(&self) -> Result<Vec<Job>> {
        let records = self.records.read().await;
        let mut all: Vec<Job> = records.jobs.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }
}

/// In-memory object storage. References are `memory://{key}`.
#[derive(Default, Clone)]
pub struct InMemoryFileStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn put(&self, key: &str, _content_type: Option<&str>, bytes: Vec<u8>) -> Result<String> {
        let mut objects = self.objects.write().await;
        objects.insert(key.to_string(), bytes);
        Ok(format!("memory://{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::fixtures;
    use crate::domain::job::{FulfillmentMode, PaymentStatus, PrintStatus};

    #[tokio::test]
    async fn test_in_memory_job_store() {
        let store = InMemoryJobStore::new();
        let job = fixtures::job(1234, FulfillmentMode::Pickup);

        let stored = store.create(job.clone()).await.unwrap();
        assert!(!stored.record_id.is_empty());
        assert_eq!(stored.job, job);

        let retrieved = store.find_by_job_id(&job.job_id).await.unwrap().unwrap();
        assert_eq!(retrieved, job);

        assert!(
            store
                .find_by_job_id(&JobId::from_number(4321))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_in_memory_update() {
        let store = InMemoryJobStore::new();
        let job = fixtures::job(1234, FulfillmentMode::Delivery);
        store.create(job.clone()).await.unwrap();

        let update = JobUpdate {
            payment_status: Some(PaymentStatus::Paid),
            print_status: Some(PrintStatus::Approved),
            print_code: Some(Some("ANA-1".to_string())),
            notification: Some(Some("On the way".to_string())),
            checkout_url: None,
        };
        store.update(&job.job_id, update).await.unwrap();

        let retrieved = store.find_by_job_id(&job.job_id).await.unwrap().unwrap();
        assert_eq!(retrieved.payment_status, PaymentStatus::Paid);
        assert_eq!(retrieved.print_status, PrintStatus::Approved);
        assert_eq!(retrieved.print_code.as_deref(), Some("ANA-1"));
        assert_eq!(retrieved.created_at, job.created_at);
    }

    #[tokio::test]
    async fn test_in_memory_update_unknown_job_fails() {
        let store = InMemoryJobStore::new();
        let result = store
            .update(&JobId::from_number(5555), JobUpdate::checkout_url("https://x"))
            .await;
        assert!(matches!(result, Err(PrintQError::StoreWriteFailed { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_all_jobs() {
        let store = InMemoryJobStore::new();
        store
            .create(fixtures::job(1001, FulfillmentMode::Pickup))
            .await
            .unwrap();
        store
            .create(fixtures::job(1002, FulfillmentMode::Delivery))
            .await
            .unwrap();

        assert_eq!(store.all_jobs().await.unwrap().len(), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_job_id_keeps_earlier_record() {
        let store = InMemoryJobStore::new();
        let first = fixtures::job(4242, FulfillmentMode::Pickup);
        let first_record = store.create(first.clone()).await.unwrap().record_id;
        store
            .update(
                &first.job_id,
                JobUpdate {
                    payment_status: Some(PaymentStatus::Paid),
                    print_status: Some(PrintStatus::Approved),
                    ..JobUpdate::default()
                },
            )
            .await
            .unwrap();

        let mut second = fixtures::job(4242, FulfillmentMode::Delivery);
        second.customer_name = "Ben Cruz".to_string();
        let second_record = store.create(second.clone()).await.unwrap().record_id;
        assert_ne!(first_record, second_record);
        assert_eq!(store.len().await, 2);

        let latest = store.find_by_job_id(&second.job_id).await.unwrap().unwrap();
        assert_eq!(latest.customer_name, "Ben Cruz");
        assert_eq!(latest.payment_status, PaymentStatus::Unpaid);

        let all = store.all_jobs().await.unwrap();
        let earlier = all.iter().find(|job| job.customer_name == "Ana Reyes").unwrap();
        assert_eq!(earlier.payment_status, PaymentStatus::Paid);
        assert_eq!(earlier.print_status, PrintStatus::Approved);
    }

    #[tokio::test]
    async fn test_in_memory_file_store() {
        let files = InMemoryFileStore::new();
        let reference = files
            .put("Print-1234/1_abc_a.pdf", Some("application/pdf"), b"%PDF".to_vec())
            .await
            .unwrap();

        assert_eq!(reference, "memory://Print-1234/1_abc_a.pdf");
        assert_eq!(files.get("Print-1234/1_abc_a.pdf").await.unwrap(), b"%PDF");
        assert_eq!(files.keys().await, vec!["Print-1234/1_abc_a.pdf".to_string()]);
    }
}
