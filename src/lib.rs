// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod api;        // data-source HTTP routes
pub mod auth;       // bearer credential gate
pub mod client;     // dashboard channel client session
pub mod config;     // server config loading + validation
pub mod errors;     // error handling
pub mod fetch;      // fetch executor + transforms
pub mod hub;        // broadcast hub + channel listener
pub mod model;      // records and channel events
pub mod observability;
pub mod registry;   // owner-scoped data-source records
pub mod traits;     // store and upstream seams
