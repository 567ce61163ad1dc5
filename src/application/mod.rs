//! Application layer containing the print-job lifecycle orchestration.
//!
//! `PrintEngine` is the entry point. Each operation lives in its own module and
//! talks to storage and the payment gateway only through the domain ports.
//! Webhook reconciliation for one job id is serialized with per-key locks.

pub mod allocator;
pub mod checkout;
pub mod engine;
pub mod locks;
pub mod reconciler;
pub mod status;
pub mod submission;
