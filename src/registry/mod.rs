// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data-source registry: owner-scoped CRUD over records plus the sample catalog.

mod memory;
mod service;
mod sqlite;

pub mod samples;

pub use memory::MemoryStore;
pub use service::DataSourceRegistry;
pub use sqlite::SqliteStore;
