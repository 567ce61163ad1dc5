use crate::domain::job::{Job, JobId, JobUpdate, StoredJob};
use crate::domain::ports::JobStore;
use crate::error::{PrintQError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for job documents, keyed by record id.
pub const CF_RECORDS: &str = "records";
/// Column Family mapping a job id to its record ids, oldest first.
pub const CF_JOB_INDEX: &str = "job_index";

/// A persistent job store backed by RocksDB.
///
/// Job documents are stored as JSON under their record id, so a job created
/// under an id already in use never replaces the earlier document. Lookups by
/// job id resolve to the newest record.
///
/// Writes are read-modify-write, serialized by `write_lock` so that a partial
/// update never puts back fields another writer has just changed. `Clone`
/// shares the underlying `Arc<DB>` and the lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// `records` and `job_index` column families if they are missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_records = ColumnFamilyDescriptor::new(CF_RECORDS, Options::default());
        let cf_index = ColumnFamilyDescriptor::new(CF_JOB_INDEX, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_records, cf_index])
            .map_err(|e| PrintQError::Config(format!("cannot open job database: {e}")))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str, job_id: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PrintQError::store_read(job_id, format!("{name} column family not found")))
    }

    fn record_ids(&self, job_id: &JobId) -> Result<Vec<String>> {
        let cf = self.cf(CF_JOB_INDEX, job_id.as_str())?;

        match self
            .db
            .get_cf(&cf, job_id.as_str())
            .map_err(|e| PrintQError::store_read(job_id.as_str(), e))?
        {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| PrintQError::store_read(job_id.as_str(), e)),
            None => Ok(Vec::new()),
        }
    }

    /// The newest record for `job_id` with its record id.
    fn latest(&self, job_id: &JobId) -> Result<Option<(String, Job)>> {
        let Some(record_id) = self.record_ids(job_id)?.pop() else {
            return Ok(None);
        };
        let cf = self.cf(CF_RECORDS, job_id.as_str())?;

        match self
            .db
            .get_cf(&cf, record_id.as_bytes())
            .map_err(|e| PrintQError::store_read(job_id.as_str(), e))?
        {
            Some(bytes) => {
                let job = serde_json::from_slice(&bytes)
                    .map_err(|e| PrintQError::store_read(job_id.as_str(), e))?;
                Ok(Some((record_id, job)))
            }
            None => Err(PrintQError::store_read(
                job_id.as_str(),
                format!("index points at missing record {record_id}"),
            )),
        }
    }
}

#[async_trait]
impl JobStore for RocksDBStore {
    async fn create(&self, job: Job) -> Result<StoredJob> {
        let job_id = job.job_id.as_str();
        let record_id = Uuid::new_v4().to_string();
        let _write = self.write_lock.lock().await;

        let mut ids = self
            .record_ids(&job.job_id)
            .map_err(|e| PrintQError::store_write(job_id, e))?;
        if !ids.is_empty() {
            tracing::warn!(job_id, existing = ids.len(), "job id already in use, keeping earlier records");
        }
        ids.push(record_id.clone());

        let records = self.cf(CF_RECORDS, job_id)?;
        let index = self.cf(CF_JOB_INDEX, job_id)?;
        let document = serde_json::to_vec(&job).map_err(|e| PrintQError::store_write(job_id, e))?;
        let ids = serde_json::to_vec(&ids).map_err(|e| PrintQError::store_write(job_id, e))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&records, record_id.as_bytes(), document);
        batch.put_cf(&index, job_id, ids);
        self.db
            .write(batch)
            .map_err(|e| PrintQError::store_write(job_id, e))?;

        Ok(StoredJob { record_id, job })
    }

    async fn find_by_job_id(&self, job_id: &JobId) -> Result<Option<Job>> {
        Ok(self.latest(job_id)?.map(|(_, job)| job))
    }

    async fn update(&self, job_id: &JobId, update: JobUpdate) -> Result<()> {
        let _write = self.write_lock.lock().await;

        let (record_id, mut job) = self
            .latest(job_id)
            .map_err(|e| PrintQError::store_write(job_id.as_str(), e))?
            .ok_or_else(|| PrintQError::store_write(job_id.as_str(), "no such job record"))?;
        job.apply(&update);

        let cf = self.cf(CF_RECORDS, job_id.as_str())?;
        let document =
            serde_json::to_vec(&job).map_err(|e| PrintQError::store_write(job_id.as_str(), e))?;
        self.db
            .put_cf(&cf, record_id.as_bytes(), document)
            .map_err(|e| PrintQError::store_write(job_id.as_str(), e))
    }

    async fn all_jobs(&self) -> Result<Vec<Job>> {
        let cf = self.cf(CF_RECORDS, "*")?;

        let mut jobs = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| PrintQError::store_read("*", e))?;
            let job: Job =
                serde_json::from_slice(&value).map_err(|e| PrintQError::store_read("*", e))?;
            jobs.push(job);
        }
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(jobs)
    }
}
