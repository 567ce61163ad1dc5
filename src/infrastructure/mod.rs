//! Adapters implementing the domain ports.

pub mod in_memory;
pub mod local_fs;
pub mod paymongo;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
