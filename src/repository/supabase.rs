//! Supabase Config Store
//!
//! Remote persistence over the Supabase PostgREST API. Rows are
//! `(user_id, widget_key, data, updated_at)`; per-user scoping lives in
//! the store instance so the trait surface stays key -> map.

use async_trait::async_trait;
use serde_json::json;

use super::traits::{ConfigMap, ConfigStore};
use crate::domain::{DomainError, DomainResult};

const CONFIG_TABLE: &str = "widget_configurations";

/// Supabase (PostgREST) implementation of ConfigStore
pub struct SupabaseConfigStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    user_id: String,
}

impl SupabaseConfigStore {
    /// `base_url` is the project URL (e.g. `https://xyz.supabase.co`);
    /// `api_key` doubles as the bearer token for row-level-security reads.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            user_id: user_id.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, CONFIG_TABLE)
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

#[async_trait]
impl ConfigStore for SupabaseConfigStore {
    async fn load(&self, key: &str) -> DomainResult<ConfigMap> {
        let request = self.client.get(self.table_url()).query(&[
            ("user_id", format!("eq.{}", self.user_id)),
            ("widget_key", format!("eq.{}", key)),
            ("select", "data".to_string()),
        ]);

        let response = self
            .auth(request)
            .send()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DomainError::Storage(format!(
                "config fetch for '{}' returned {}",
                key,
                response.status()
            )));
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        match rows.into_iter().next() {
            Some(mut row) => match row.get_mut("data").map(serde_json::Value::take) {
                Some(serde_json::Value::Object(map)) => Ok(map),
                _ => Ok(ConfigMap::new()),
            },
            None => Ok(ConfigMap::new()),
        }
    }

    async fn save(&self, key: &str, data: &ConfigMap) -> DomainResult<()> {
        let rows = json!([{
            "user_id": self.user_id,
            "widget_key": key,
            "data": data,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        }]);

        let request = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", "user_id,widget_key")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&rows);

        let response = self
            .auth(request)
            .send()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DomainError::Storage(format!(
                "config save for '{}' returned {}",
                key,
                response.status()
            )));
        }

        Ok(())
    }
}
