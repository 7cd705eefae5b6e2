//! Adapters for the domain ports: storage backends and the mail relay.

pub mod in_memory;
pub mod relay;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
