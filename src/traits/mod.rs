// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod store;
pub mod upstream;

pub use store::DataSourceStore;
pub use upstream::UpstreamClient;
