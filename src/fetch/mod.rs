// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fetch execution: turns a data-source record into its normalized payload.

mod executor;
mod http;
mod transform;

pub use executor::FetchExecutor;
pub use http::{FetchSettings, ReqwestClient};
pub use transform::{Transform, TransformForm};
