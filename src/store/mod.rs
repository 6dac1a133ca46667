// src/store/mod.rs

//! # Storage
//!
//! Key-value get/set of JSON documents. Everything the service persists
//! lives under a handful of well-known keys (see `repository::keys`).
//!
//! Available adapters:
//! - `SqliteStore` - sqlx-backed table (persistent)
//! - `MemoryStore` - in-memory HashMap (tests, volatile)

mod memory;
mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key-value storage port.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Stores `value` under `key`, replacing what was there.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}
