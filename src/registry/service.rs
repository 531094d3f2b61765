// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Owner-scoped operations over data-source records.
//!
//! Every call takes the caller identity resolved by the auth gate. The owner
//! of a record is always the identity that created it; nothing in a create or
//! update body can change it.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::errors::RegistryError;
use crate::model::{normalize_name, DataSource, DataSourcePatch, NewDataSource, SourceConfig};
use crate::observability::messages::registry::{
    AccessRefused, DataSourceCreated, DataSourceDeleted, DataSourceUpdated,
};
use crate::observability::messages::StructuredLog;
use crate::registry::samples;
use crate::registry::MemoryStore;
use crate::traits::DataSourceStore;

/// Registry of data sources backed by a [`DataSourceStore`].
#[derive(Clone)]
pub struct DataSourceRegistry {
    store: Arc<dyn DataSourceStore>,
}

impl DataSourceRegistry {
    pub fn new(store: Arc<dyn DataSourceStore>) -> Self {
        Self { store }
    }

    /// Registry over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Create a record owned by `owner_id`.
    ///
    /// Name and kind are required; visibility defaults to private.
    pub async fn create(
        &self,
        owner_id: &str,
        spec: NewDataSource,
    ) -> Result<DataSource, RegistryError> {
        let name = normalize_name(spec.name.as_deref().unwrap_or_default())?;
        let kind = spec
            .kind
            .ok_or_else(|| RegistryError::Validation("kind is required".to_string()))?;
        let config = SourceConfig::from_parts(kind, spec.config)?;

        let now = Utc::now();
        let source = DataSource {
            id: new_source_id(),
            name,
            description: spec.description,
            config,
            owner: owner_id.to_string(),
            is_public: spec.is_public,
            created_at: now,
            updated_at: now,
        };

        self.store.insert(source.clone()).await?;

        DataSourceCreated {
            source_id: &source.id,
            owner: owner_id,
            kind: source.kind().as_str(),
            is_public: source.is_public,
        }
        .log();

        Ok(source)
    }

    /// Records owned by `owner_id` or flagged public, in creation order.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<DataSource>, RegistryError> {
        self.store.list_visible(owner_id).await
    }

    /// Read a record the caller owns or that is public.
    ///
    /// A private record owned by someone else is reported as not found.
    pub async fn get(&self, id: &str, owner_id: &str) -> Result<DataSource, RegistryError> {
        match self.store.get(id).await? {
            Some(source) if source.is_readable_by(owner_id) => Ok(source),
            Some(_) => {
                AccessRefused {
                    source_id: id,
                    caller: owner_id,
                    action: "read",
                }
                .log();
                Err(RegistryError::source_not_found())
            }
            None => Err(RegistryError::source_not_found()),
        }
    }

    /// Apply `patch` to a record owned by `owner_id`.
    ///
    /// Public visibility grants no write access.
    pub async fn update(
        &self,
        id: &str,
        owner_id: &str,
        patch: DataSourcePatch,
    ) -> Result<DataSource, RegistryError> {
        let mut source = self.owned(id, owner_id, "edit").await?;
        let mut fields: Vec<&str> = Vec::new();

        if let Some(name) = patch.name.as_deref() {
            source.name = normalize_name(name)?;
            fields.push("name");
        }
        if let Some(description) = patch.description {
            source.description = description;
            fields.push("description");
        }
        if let Some(config) = patch.config.as_ref() {
            source.config = source.config.merged(config)?;
            fields.push("config");
        }
        if let Some(is_public) = patch.is_public {
            source.is_public = is_public;
            fields.push("isPublic");
        }
        source.updated_at = Utc::now();

        // The record may have been deleted between the read and the write.
        if !self.store.replace_owned(source.clone()).await? {
            return Err(RegistryError::not_found_or_not_owner("edit"));
        }

        DataSourceUpdated {
            source_id: id,
            owner: owner_id,
            fields: &fields,
        }
        .log();

        Ok(source)
    }

    /// Delete a record owned by `owner_id`.
    pub async fn delete(&self, id: &str, owner_id: &str) -> Result<(), RegistryError> {
        if !self.store.remove_owned(id, owner_id).await? {
            if self.store.get(id).await?.is_some() {
                AccessRefused {
                    source_id: id,
                    caller: owner_id,
                    action: "delete",
                }
                .log();
            }
            return Err(RegistryError::not_found_or_not_owner("delete"));
        }

        DataSourceDeleted {
            source_id: id,
            owner: owner_id,
        }
        .log();

        Ok(())
    }

    /// Resolve a record for the fetch path.
    ///
    /// Unlike [`get`](Self::get), a private record owned by someone else is
    /// reported as [`RegistryError::Forbidden`].
    pub async fn resolve_for_fetch(
        &self,
        id: &str,
        caller_id: &str,
    ) -> Result<DataSource, RegistryError> {
        let source = self
            .store
            .get(id)
            .await?
            .ok_or_else(RegistryError::source_not_found)?;

        if !source.is_readable_by(caller_id) {
            AccessRefused {
                source_id: id,
                caller: caller_id,
                action: "fetch",
            }
            .log();
            return Err(RegistryError::Forbidden);
        }
        Ok(source)
    }

    /// Fixed sample fixture by name.
    pub fn sample(&self, name: &str) -> Result<Value, RegistryError> {
        samples::sample(name)
            .ok_or_else(|| RegistryError::NotFound("Sample data source not found".to_string()))
    }

    async fn owned(
        &self,
        id: &str,
        owner_id: &str,
        action: &str,
    ) -> Result<DataSource, RegistryError> {
        match self.store.get(id).await? {
            Some(source) if source.is_owned_by(owner_id) => Ok(source),
            Some(_) => {
                AccessRefused {
                    source_id: id,
                    caller: owner_id,
                    action,
                }
                .log();
                Err(RegistryError::not_found_or_not_owner(action))
            }
            None => Err(RegistryError::not_found_or_not_owner(action)),
        }
    }
}

/// 24 lowercase hex characters.
fn new_source_id() -> String {
    rand::random::<[u8; 12]>()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
