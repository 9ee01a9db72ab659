//! In-Memory Config Store
//!
//! Used by tests and as an offline fallback when no backend is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::traits::{ConfigMap, ConfigStore};
use crate::domain::DomainResult;

/// HashMap-backed implementation of ConfigStore
#[derive(Default)]
pub struct MemoryConfigStore {
    configs: Mutex<HashMap<String, ConfigMap>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self, key: &str) -> DomainResult<ConfigMap> {
        let configs = self.configs.lock().await;
        Ok(configs.get(key).cloned().unwrap_or_default())
    }

    async fn save(&self, key: &str, data: &ConfigMap) -> DomainResult<()> {
        let mut configs = self.configs.lock().await;
        configs.insert(key.to_string(), data.clone());
        Ok(())
    }
}
