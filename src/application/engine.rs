use super::allocator::IdAllocator;
use super::checkout::{self, CheckoutInput, CheckoutLink};
use super::reconciler::{WebhookAck, WebhookReconciler};
use super::status;
use super::submission::{self, JobSubmission, SubmissionReceipt};
use crate::domain::event::GatewayEvent;
use crate::domain::job::{Job, StatusView};
use crate::domain::ports::{CheckoutGatewayBox, FileStoreBox, JobStoreBox};
use crate::error::{PrintQError, Result};

/// The main entry point for the print-job lifecycle.
///
/// `PrintEngine` owns the storage and gateway adapters and exposes the four
/// external operations. It keeps no job state of its own, so one instance can
/// be shared (`Arc<PrintEngine>`) across concurrent requests.
pub struct PrintEngine {
    jobs: JobStoreBox,
    files: FileStoreBox,
    gateway: Option<CheckoutGatewayBox>,
    allocator: IdAllocator,
    reconciler: WebhookReconciler,
}

impl PrintEngine {
    /// Creates a new `PrintEngine` without a payment gateway.
    ///
    /// # Arguments
    ///
    /// * `jobs` - The record store for jobs.
    /// * `files` - The object store for uploaded files.
    pub fn new(jobs: JobStoreBox, files: FileStoreBox) -> Self {
        Self {
            jobs,
            files,
            gateway: None,
            allocator: IdAllocator::new(),
            reconciler: WebhookReconciler::new(),
        }
    }

    pub fn with_gateway(mut self, gateway: CheckoutGatewayBox) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_allocator(mut self, allocator: IdAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Creates a job from a submission and returns its id and record id.
    pub async fn submit(&self, submission: JobSubmission) -> Result<SubmissionReceipt> {
        submission::submit(
            self.jobs.as_ref(),
            self.files.as_ref(),
            &self.allocator,
            submission,
        )
        .await
    }

    /// Opens a gateway checkout session for a job.
    pub async fn create_checkout(&self, input: &CheckoutInput) -> Result<CheckoutLink> {
        let gateway = self
            .gateway
            .as_deref()
            .ok_or_else(|| PrintQError::Config("no payment gateway configured".to_string()))?;
        checkout::create_checkout(self.jobs.as_ref(), gateway, input).await
    }

    /// Reconciles a raw webhook body. Unparseable bodies are acknowledged.
    pub async fn handle_webhook(&self, body: &[u8]) -> Result<WebhookAck> {
        self.reconcile(&GatewayEvent::from_slice(body)).await
    }

    pub async fn reconcile(&self, event: &GatewayEvent) -> Result<WebhookAck> {
        self.reconciler.reconcile(self.jobs.as_ref(), event).await
    }

    pub async fn status(&self, job_id: &str) -> Result<StatusView> {
        status::get_status(self.jobs.as_ref(), job_id).await
    }

    /// Every job, oldest first.
    pub async fn all_jobs(&self) -> Result<Vec<Job>> {
        self.jobs.all_jobs().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::submission::FileUpload;
    use crate::domain::job::{PaymentStatus, PrintStatus};
    use crate::infrastructure::in_memory::{InMemoryFileStore, InMemoryJobStore};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn engine() -> PrintEngine {
        PrintEngine::new(
            Box::new(InMemoryJobStore::new()),
            Box::new(InMemoryFileStore::new()),
        )
    }

    fn submission(name: &str) -> JobSubmission {
        JobSubmission {
            customer_name: Some(name.to_string()),
            customer_phone: Some("0917".to_string()),
            fulfillment_mode: Some("pickup".to_string()),
            amount: Some(dec!(20)),
            files: vec![FileUpload {
                file_name: "a.pdf".to_string(),
                content_type: None,
                bytes: vec![1, 2, 3],
            }],
            ..JobSubmission::default()
        }
    }

    #[tokio::test]
    async fn test_checkout_without_gateway_is_config_error() {
        let result = engine()
            .create_checkout(&CheckoutInput {
                job_id: Some("Print-1234".to_string()),
                amount: Some(dec!(1)),
                email: Some("a@b.c".to_string()),
            })
            .await;
        assert!(matches!(result, Err(PrintQError::Config(_))));
    }

    #[tokio::test]
    async fn test_webhook_garbage_is_acknowledged() {
        let ack = engine().handle_webhook(b"\x00\x01 not json").await.unwrap();
        assert!(!ack.is_applied());
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_deliveries_apply_once() {
        let engine = Arc::new(engine());
        let receipt = engine.submit(submission("Ben")).await.unwrap();
        let body = format!(
            r#"{{"status":"succeeded","metadata":{{"jobId":"{}"}}}}"#,
            receipt.job_id
        );

        let mut handles = Vec::new();
        for _ in 0..10 {
            let engine = engine.clone();
            let body = body.clone();
            handles.push(tokio::spawn(async move {
                engine.handle_webhook(body.as_bytes()).await.unwrap()
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_applied() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);

        let view = engine.status(receipt.job_id.as_str()).await.unwrap();
        assert_eq!(view.payment_status, PaymentStatus::Paid);
        assert_eq!(view.print_status, PrintStatus::Approved);
    }

    #[tokio::test]
    async fn test_all_jobs_lists_submissions() {
        let engine = engine();
        engine.submit(submission("Ana")).await.unwrap();
        engine.submit(submission("Ben")).await.unwrap();
        assert_eq!(engine.all_jobs().await.unwrap().len(), 2);
    }
}
