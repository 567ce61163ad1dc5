//! Domain model: jobs, money, webhook events and the ports the application
//! layer talks to.

pub mod amount;
pub mod event;
pub mod file_ref;
pub mod job;
pub mod ports;
