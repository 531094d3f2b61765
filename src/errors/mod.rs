// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod channel;
mod config;
mod fetch;
mod hub;
mod registry;

pub use channel::ChannelError;
pub use config::ConfigError;
pub use fetch::FetchError;
pub use hub::HubError;
pub use registry::RegistryError;
