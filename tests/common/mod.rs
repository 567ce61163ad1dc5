#![allow(dead_code)]

use printq::application::engine::PrintEngine;
use printq::application::submission::{FileUpload, JobSubmission};
use printq::domain::job::JobId;
use printq::infrastructure::in_memory::{InMemoryFileStore, InMemoryJobStore};
use rust_decimal::Decimal;
use serde_json::{Value, json};

pub fn engine() -> PrintEngine {
    PrintEngine::new(
        Box::new(InMemoryJobStore::new()),
        Box::new(InMemoryFileStore::new()),
    )
}

pub fn submission(name: &str, fulfillment: &str, amount: Decimal) -> JobSubmission {
    JobSubmission {
        customer_name: Some(name.to_string()),
        customer_phone: Some("09181112222".to_string()),
        page_count: Some("4".to_string()),
        copy_count: Some("2".to_string()),
        color_mode: Some("color".to_string()),
        fulfillment_mode: Some(fulfillment.to_string()),
        location: None,
        amount: Some(amount),
        files: vec![FileUpload {
            file_name: "thesis final.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.7 test".to_vec(),
        }],
    }
}

/// A PayMongo `checkout_session.payment.paid` style event for `job_id`.
pub fn paymongo_event(job_id: &JobId, event_type: &str, payment_status: &str) -> Value {
    json!({
        "data": {
            "id": "evt_test",
            "type": "event",
            "attributes": {
                "type": event_type,
                "data": {
                    "id": "cs_test",
                    "type": "checkout_session",
                    "attributes": {
                        "description": format!("PrintQ - {job_id}"),
                        "metadata": { "jobId": job_id.as_str() },
                        "payments": [
                            {
                                "id": "pay_test",
                                "type": "payment",
                                "attributes": { "status": payment_status }
                            }
                        ]
                    }
                }
            }
        }
    })
}

/// The flat `{status, metadata}` shape.
pub fn flat_event(job_id: &JobId, status: &str) -> Value {
    json!({
        "status": status,
        "metadata": { "jobId": job_id.as_str() }
    })
}

pub fn body(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}
