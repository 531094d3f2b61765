// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::RegistryError;
use crate::model::DataSource;
use crate::traits::DataSourceStore;

/// In-process record store. Records are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<DataSource>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSourceStore for MemoryStore {
    async fn insert(&self, record: DataSource) -> Result<(), RegistryError> {
        let mut records = self.records.write().await;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(RegistryError::Storage(format!(
                "duplicate data source id '{}'",
                record.id
            )));
        }
        records.push(record);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<DataSource>, RegistryError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn list_visible(&self, user_id: &str) -> Result<Vec<DataSource>, RegistryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.is_readable_by(user_id))
            .cloned()
            .collect())
    }

    async fn replace_owned(&self, record: DataSource) -> Result<bool, RegistryError> {
        let mut records = self.records.write().await;
        match records
            .iter_mut()
            .find(|existing| existing.id == record.id && existing.owner == record.owner)
        {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_owned(&self, id: &str, owner: &str) -> Result<bool, RegistryError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| !(record.id == id && record.owner == owner));
        Ok(records.len() != before)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
