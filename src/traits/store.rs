// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::RegistryError;
use crate::model::DataSource;

/// Persistence seam for data-source records.
///
/// Stores know nothing about callers; ownership and visibility rules live in
/// [`crate::registry::DataSourceRegistry`]. The only scoped operations here are
/// the ones that must be atomic with their ownership check.
#[async_trait]
pub trait DataSourceStore: Send + Sync {
    /// Insert a new record. Ids are unique.
    async fn insert(&self, record: DataSource) -> Result<(), RegistryError>;

    async fn get(&self, id: &str) -> Result<Option<DataSource>, RegistryError>;

    /// Records owned by `user_id` or flagged public, in creation order.
    async fn list_visible(&self, user_id: &str) -> Result<Vec<DataSource>, RegistryError>;

    /// Replace a record if it exists and is still owned by `record.owner`.
    /// Returns `false` when nothing matched.
    async fn replace_owned(&self, record: DataSource) -> Result<bool, RegistryError>;

    /// Remove a record if it is owned by `owner`. Returns `false` when nothing matched.
    async fn remove_owned(&self, id: &str, owner: &str) -> Result<bool, RegistryError>;

    fn backend(&self) -> &'static str;
}
