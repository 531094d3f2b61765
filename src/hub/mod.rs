// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Broadcast hub: dashboard rooms and widget update fanout.
//!
//! * [`Rooms`] - membership bookkeeping
//! * [`BroadcastHub`] - single-task owner of the rooms, driven by commands
//! * [`serve`] - TCP accept loop speaking the newline-delimited JSON protocol

mod actor;
mod rooms;
mod server;


pub use actor::{BroadcastHub, Outbound};
pub use rooms::{ChannelId, Rooms};
pub use server::{serve, serve_with_limit};
