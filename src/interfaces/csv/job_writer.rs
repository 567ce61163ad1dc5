use crate::domain::job::{Job, PaymentStatus, PrintStatus};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JobRow<'a> {
    job_id: &'a str,
    customer: &'a str,
    phone: &'a str,
    pages: u32,
    copies: u32,
    color: &'a str,
    fulfillment: &'a str,
    location: &'a str,
    files: usize,
    amount: String,
    payment_status: PaymentStatus,
    print_status: PrintStatus,
    print_code: &'a str,
    notification: &'a str,
    created_at: String,
}

impl<'a> From<&'a Job> for JobRow<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            job_id: job.job_id.as_str(),
            customer: &job.customer_name,
            phone: &job.customer_phone,
            pages: job.page_count,
            copies: job.copy_count,
            color: &job.color_mode,
            fulfillment: job.fulfillment_mode.as_str(),
            location: job.location.as_deref().unwrap_or_default(),
            files: job.file_refs.len(),
            amount: job.amount_due.to_string(),
            payment_status: job.payment_status,
            print_status: job.print_status,
            print_code: job.print_code.as_deref().unwrap_or_default(),
            notification: job.notification.as_deref().unwrap_or_default(),
            created_at: job.created_at.to_rfc3339(),
        }
    }
}

/// Writes a status report of jobs as CSV, one row per job.
pub struct JobWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> JobWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    pub fn write_jobs<'a>(&mut self, jobs: impl IntoIterator<Item = &'a Job>) -> Result<()> {
        for job in jobs {
            self.writer.serialize(JobRow::from(job))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
