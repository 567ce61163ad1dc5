//! Inbound payment-gateway webhook bodies.
//!
//! Gateways do not agree on a shape, so a body is parsed into one of the
//! recognized layouts below. Anything else becomes `Unrecognized`, which the
//! reconciler acknowledges without acting on.

use super::job::JobId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Template shared with the checkout payload. The job id after the prefix is
/// the fallback correlation channel for events without metadata.
pub const DESCRIPTION_PREFIX: &str = "PrintQ - ";

pub fn checkout_description(job_id: &JobId) -> String {
    format!("{DESCRIPTION_PREFIX}{job_id}")
}

/// Inverse of [`checkout_description`].
pub fn job_id_from_description(description: &str) -> Option<JobId> {
    let (_, tail) = description.split_once(DESCRIPTION_PREFIX)?;
    let candidate = tail.split_whitespace().next()?;
    JobId::parse(candidate)
}

/// Payment result carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Paid,
    Rejected,
}

impl PaymentOutcome {
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "succeeded" | "paid" => Some(Self::Paid),
            "failed" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Why an event was acknowledged without a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IgnoreReason {
    UnrecognizedPayload,
    MissingCorrelationKey,
    UnhandledStatus { status: String },
    UnknownJob { job_id: JobId },
    AlreadySettled { job_id: JobId },
}

/// Shared attribute block of the resource a PayMongo event carries (a
/// checkout session or a payment).
#[derive(Debug, Clone, Deserialize)]
pub struct PayMongoResourceAttributes {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub payments: Vec<PayMongoResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayMongoResource {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub attributes: PayMongoResourceAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayMongoEventAttributes {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: PayMongoResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayMongoEventData {
    pub attributes: PayMongoEventAttributes,
}

/// `{"data": {"attributes": {"type": "...", "data": {...resource...}}}}`
#[derive(Debug, Clone, Deserialize)]
pub struct PayMongoEvent {
    pub data: PayMongoEventData,
}

/// A status-bearing object with optional correlation fields.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentObject {
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEnvelopeData {
    pub object: PaymentObject,
}

/// `{"type": "...", "data": {"object": {...}}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEnvelope {
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    pub data: ObjectEnvelopeData,
}

/// `{"data": {status, description, metadata}}`
#[derive(Debug, Clone, Deserialize)]
pub struct WrappedObject {
    pub data: PaymentObject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecognizedShape {
    PayMongo(PayMongoEvent),
    ObjectEnvelope(ObjectEnvelope),
    Wrapped(WrappedObject),
    Flat(PaymentObject),
}

/// A parsed webhook body.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    PayMongo(PayMongoEvent),
    ObjectEnvelope(ObjectEnvelope),
    Flat(PaymentObject),
    Unrecognized,
}

impl GatewayEvent {
    /// Parses a raw body. Never fails; unparseable input is `Unrecognized`.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<RecognizedShape>(body) {
            Ok(shape) => Self::from_shape(shape),
            Err(_) => Self::Unrecognized,
        }
    }

    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<RecognizedShape>(value) {
            Ok(shape) => Self::from_shape(shape),
            Err(_) => Self::Unrecognized,
        }
    }

    fn from_shape(shape: RecognizedShape) -> Self {
        match shape {
            RecognizedShape::PayMongo(event) => Self::PayMongo(event),
            RecognizedShape::ObjectEnvelope(envelope) => Self::ObjectEnvelope(envelope),
            RecognizedShape::Wrapped(wrapped) => Self::Flat(wrapped.data),
            RecognizedShape::Flat(object) => Self::Flat(object),
        }
    }

    /// Correlation key: structured metadata first, description second.
    pub fn correlation_key(&self) -> Option<JobId> {
        match self {
            Self::PayMongo(event) => {
                let resource = &event.data.attributes.data.attributes;
                correlate(resource.metadata.as_ref(), resource.description.as_deref()).or_else(
                    || {
                        resource.payments.iter().find_map(|payment| {
                            correlate(
                                payment.attributes.metadata.as_ref(),
                                payment.attributes.description.as_deref(),
                            )
                        })
                    },
                )
            }
            Self::ObjectEnvelope(envelope) => {
                let object = &envelope.data.object;
                correlate(object.metadata.as_ref(), object.description.as_deref())
            }
            Self::Flat(object) => correlate(object.metadata.as_ref(), object.description.as_deref()),
            Self::Unrecognized => None,
        }
    }

    /// The raw status string the outcome is derived from, if any.
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::PayMongo(event) => {
                let attributes = &event.data.attributes;
                let resource = &attributes.data.attributes;
                let recognized = |s: &&str| PaymentOutcome::from_status(s).is_some();

                resource
                    .status
                    .as_deref()
                    .filter(recognized)
                    .or_else(|| {
                        resource
                            .payments
                            .iter()
                            .filter_map(|p| p.attributes.status.as_deref())
                            .find(recognized)
                    })
                    .or_else(|| attributes.event_type.rsplit('.').next().filter(recognized))
                    .or(resource.status.as_deref())
            }
            Self::ObjectEnvelope(envelope) => Some(envelope.data.object.status.as_str()),
            Self::Flat(object) => Some(object.status.as_str()),
            Self::Unrecognized => None,
        }
    }

    /// Correlation key and outcome, or the reason the event is a no-op.
    pub fn interpret(&self) -> Result<(JobId, PaymentOutcome), IgnoreReason> {
        if matches!(self, Self::Unrecognized) {
            return Err(IgnoreReason::UnrecognizedPayload);
        }
        let job_id = self
            .correlation_key()
            .ok_or(IgnoreReason::MissingCorrelationKey)?;
        let status = self.status().unwrap_or_default();
        let outcome =
            PaymentOutcome::from_status(status).ok_or_else(|| IgnoreReason::UnhandledStatus {
                status: status.to_string(),
            })?;
        Ok((job_id, outcome))
    }
}

fn metadata_job_id(metadata: Option<&Value>) -> Option<JobId> {
    let metadata = metadata?;
    ["jobId", "job_id"]
        .iter()
        .filter_map(|key| metadata.get(*key).and_then(Value::as_str))
        .find_map(JobId::parse)
}

fn correlate(metadata: Option<&Value>, description: Option<&str>) -> Option<JobId> {
    metadata_job_id(metadata).or_else(|| description.and_then(job_id_from_description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(n: u16) -> JobId {
        JobId::from_number(n)
    }

    #[test]
    fn test_description_round_trip() {
        let id = job(4821);
        assert_eq!(job_id_from_description(&checkout_description(&id)), Some(id));
        assert_eq!(job_id_from_description("Payment for PrintQ - Print-1234 (2 files)"), Some(job(1234)));
        assert_eq!(job_id_from_description("PrintQ - "), None);
        assert_eq!(job_id_from_description("Print-1234"), None);
    }

    #[test]
    fn test_flat_event_prefers_metadata() {
        let event = GatewayEvent::from_value(json!({
            "status": "succeeded",
            "metadata": { "jobId": "Print-1111" },
            "description": "PrintQ - Print-2222"
        }));
        assert_eq!(event.interpret(), Ok((job(1111), PaymentOutcome::Paid)));
    }

    #[test]
    fn test_flat_event_falls_back_to_description() {
        let event = GatewayEvent::from_value(json!({
            "status": "failed",
            "metadata": {},
            "description": "PrintQ - Print-2222"
        }));
        assert_eq!(event.interpret(), Ok((job(2222), PaymentOutcome::Rejected)));
    }

    #[test]
    fn test_wrapped_event() {
        let event = GatewayEvent::from_value(json!({
            "data": { "status": "paid", "metadata": { "job_id": "Print-3333" } }
        }));
        assert!(matches!(event, GatewayEvent::Flat(_)));
        assert_eq!(event.interpret(), Ok((job(3333), PaymentOutcome::Paid)));
    }

    #[test]
    fn test_object_envelope_event() {
        let event = GatewayEvent::from_value(json!({
            "type": "payment_intent.succeeded",
            "data": { "object": { "status": "succeeded", "description": "PrintQ - Print-4444" } }
        }));
        assert!(matches!(event, GatewayEvent::ObjectEnvelope(_)));
        assert_eq!(event.interpret(), Ok((job(4444), PaymentOutcome::Paid)));
    }

    #[test]
    fn test_paymongo_payment_event() {
        let event = GatewayEvent::from_value(json!({
            "data": {
                "id": "evt_1",
                "type": "event",
                "attributes": {
                    "type": "payment.failed",
                    "data": {
                        "id": "pay_1",
                        "type": "payment",
                        "attributes": {
                            "status": "failed",
                            "description": "PrintQ - Print-5555"
                        }
                    }
                }
            }
        }));
        assert!(matches!(event, GatewayEvent::PayMongo(_)));
        assert_eq!(event.interpret(), Ok((job(5555), PaymentOutcome::Rejected)));
    }

    #[test]
    fn test_paymongo_checkout_session_uses_payments_and_event_type() {
        let event = GatewayEvent::from_value(json!({
            "data": {
                "attributes": {
                    "type": "checkout_session.payment.paid",
                    "data": {
                        "type": "checkout_session",
                        "attributes": {
                            "status": "active",
                            "payments": [{
                                "type": "payment",
                                "attributes": {
                                    "status": "paid",
                                    "metadata": { "jobId": "Print-6666" }
                                }
                            }]
                        }
                    }
                }
            }
        }));
        assert_eq!(event.interpret(), Ok((job(6666), PaymentOutcome::Paid)));

        let by_type = GatewayEvent::from_value(json!({
            "data": {
                "attributes": {
                    "type": "checkout_session.payment.paid",
                    "data": {
                        "attributes": {
                            "status": "active",
                            "metadata": { "jobId": "Print-7777" }
                        }
                    }
                }
            }
        }));
        assert_eq!(by_type.interpret(), Ok((job(7777), PaymentOutcome::Paid)));
    }

    #[test]
    fn test_unknown_status_is_ignored() {
        let event = GatewayEvent::from_value(json!({
            "status": "processing",
            "metadata": { "jobId": "Print-1111" }
        }));
        assert_eq!(
            event.interpret(),
            Err(IgnoreReason::UnhandledStatus {
                status: "processing".to_string()
            })
        );
    }

    #[test]
    fn test_missing_correlation_key_is_ignored() {
        let event = GatewayEvent::from_value(json!({
            "status": "paid",
            "description": "Some other shop"
        }));
        assert_eq!(event.interpret(), Err(IgnoreReason::MissingCorrelationKey));
    }

    #[test]
    fn test_unrecognized_payloads() {
        assert!(matches!(GatewayEvent::from_slice(b"not json"), GatewayEvent::Unrecognized));
        assert!(matches!(
            GatewayEvent::from_value(json!({ "hello": "world" })),
            GatewayEvent::Unrecognized
        ));
        assert!(matches!(
            GatewayEvent::from_value(json!([1, 2, 3])),
            GatewayEvent::Unrecognized
        ));
        assert_eq!(
            GatewayEvent::Unrecognized.interpret(),
            Err(IgnoreReason::UnrecognizedPayload)
        );
    }
}
