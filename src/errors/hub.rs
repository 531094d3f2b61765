// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors returned by a [`crate::hub::BroadcastHub`] handle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    /// The hub task has shut down and accepts no more commands.
    #[error("Broadcast hub has stopped")]
    Stopped,
}
