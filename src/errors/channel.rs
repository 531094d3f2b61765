// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised by the client side of the dashboard channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A membership or publish call was made without an open connection.
    #[error("Dashboard channel is not connected")]
    NotConnected,

    /// The hub could not be reached.
    #[error("Failed to connect to hub at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a frame to the open connection failed.
    #[error("Channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An outbound frame could not be encoded.
    #[error("Failed to encode channel frame: {0}")]
    Encode(#[from] serde_json::Error),
}
