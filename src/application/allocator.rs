use crate::domain::job::{JOB_NUMBER_MAX, JOB_NUMBER_MIN, JobId};
use crate::domain::ports::JobStore;
use crate::error::Result;
use rand::Rng;

/// Candidates checked against the store before the last one is accepted
/// regardless of collisions.
pub const MAX_ATTEMPTS: usize = 5;

/// Source of candidate job numbers in `[1000, 9999]`.
pub trait CandidateSource: Send + Sync {
    fn next_number(&self) -> u16;
}

/// Uniformly random candidates from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCandidates;

impl CandidateSource for RandomCandidates {
    fn next_number(&self) -> u16 {
        rand::thread_rng().gen_range(JOB_NUMBER_MIN..=JOB_NUMBER_MAX)
    }
}

/// Allocates `Print-NNNN` identifiers with best-effort uniqueness.
///
/// A candidate already present in the store is replaced, up to
/// [`MAX_ATTEMPTS`] candidates. After that the last candidate is used even if
/// it collides: a rare duplicate is preferred over refusing a submission.
pub struct IdAllocator {
    source: Box<dyn CandidateSource>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_source(RandomCandidates)
    }

    pub fn with_source(source: impl CandidateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    fn candidate(&self) -> JobId {
        JobId::from_number(self.source.next_number())
    }

    pub async fn allocate(&self, store: &dyn JobStore) -> Result<JobId> {
        let mut candidate = self.candidate();

        for attempt in 1..MAX_ATTEMPTS {
            if store.find_by_job_id(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            tracing::debug!(job_id = %candidate, attempt, "job id taken, retrying");
            candidate = self.candidate();
        }

        if store.find_by_job_id(&candidate).await?.is_some() {
            tracing::warn!(
                job_id = %candidate,
                attempts = MAX_ATTEMPTS,
                "job id still taken after retries, accepting it anyway"
            );
        }
        Ok(candidate)
    }
}
