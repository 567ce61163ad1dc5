use crate::domain::job::{JobId, StatusView};
use crate::domain::ports::JobStore;
use crate::error::{PrintQError, Result};

/// Read-only projection of a job's customer-visible fields. Ids that are not
/// of the `Print-NNNN` form cannot exist and resolve to `NotFound`.
pub async fn get_status(store: &dyn JobStore, job_id: &str) -> Result<StatusView> {
    let not_found = || PrintQError::NotFound(job_id.trim().to_string());
    let id = JobId::parse(job_id).ok_or_else(not_found)?;

    match store.find_by_job_id(&id).await {
        Ok(Some(job)) => Ok(StatusView::from(&job)),
        Ok(None) => Err(not_found()),
        Err(e) => {
            tracing::error!(job_id = %id, error = %e, "status lookup failed");
            Err(e)
        }
    }
}
