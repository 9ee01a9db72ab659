//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for widget configuration persistence.
//! Implementations can use SQLite, Supabase, in-memory, etc.

use async_trait::async_trait;

use crate::domain::DomainResult;

/// Opaque per-widget configuration: a JSON object keyed by field name.
/// The store enforces no schema; widgets default-fill missing keys.
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// Key-value configuration store, one entry per logical widget key.
///
/// All operations are async to support various backends.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch the configuration saved under `key`.
    /// Returns an empty map when nothing has been saved yet.
    async fn load(&self, key: &str) -> DomainResult<ConfigMap>;

    /// Persist `data` under `key`, replacing any previous value.
    async fn save(&self, key: &str, data: &ConfigMap) -> DomainResult<()>;
}
