// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Client side of the dashboard channel.

mod channel;
mod listeners;

pub use channel::ClientChannel;
pub use listeners::{ListenerId, ListenerRegistry, WidgetListener};
