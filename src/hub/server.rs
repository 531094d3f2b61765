// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! TCP transport for the dashboard channel protocol.
//!
//! Each accepted connection gets a reader loop that decodes one
//! [`ClientEvent`] per newline-delimited frame and forwards it to the hub, and a writer task that
//! drains the connection's outbound queue. When the peer goes away the
//! connection is disconnected from the hub, which drops it from every room.

use std::io;
use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use crate::errors::HubError;
use crate::hub::actor::{BroadcastHub, Outbound};
use crate::hub::rooms::ChannelId;
use crate::config::consts::DEFAULT_MAX_FRAME_BYTES;
use crate::model::{ClientEvent, Frame, FrameReader};
use crate::observability::messages::hub::{HubListening, MalformedFrame};
use crate::observability::messages::StructuredLog;

/// Accept channel connections on `listener` until `cancel` fires.
///
/// The hub is injected so callers decide its lifetime; stopping the listener
/// does not stop the hub.
pub async fn serve(
    listener: TcpListener,
    hub: BroadcastHub,
    cancel: CancellationToken,
) -> io::Result<()> {
    serve_with_limit(listener, hub, cancel, DEFAULT_MAX_FRAME_BYTES).await
}

/// [`serve`] with an explicit cap on inbound frame length. Longer frames are
/// dropped as malformed and the connection stays open.
pub async fn serve_with_limit(
    listener: TcpListener,
    hub: BroadcastHub,
    cancel: CancellationToken,
    max_frame_bytes: usize,
) -> io::Result<()> {
    let local = listener.local_addr()?;
    HubListening {
        addr: &local.to_string(),
    }
    .log();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept channel connection");
                        continue;
                    }
                };
                let hub = hub.clone();
                let cancel = cancel.child_token();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, peer, hub, cancel, max_frame_bytes).await {
                        tracing::debug!(peer = %peer, error = %e, "Channel connection ended with error");
                    }
                });
            }
        }
    }

    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    hub: BroadcastHub,
    cancel: CancellationToken,
    max_frame_bytes: usize,
) -> io::Result<()> {
    let (channel, outbound) = hub
        .register(&peer.to_string())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let (read_half, write_half) = stream.into_split();
    let writer = tokio::spawn(write_events(write_half, outbound));

    let mut frames = FrameReader::new(read_half, max_frame_bytes);
    let result = loop {
        tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            frame = frames.next_frame() => match frame {
                Ok(Some(Frame::Line(bytes))) => {
                    if let Err(e) = dispatch(&hub, channel, &bytes) {
                        break Err(io::Error::new(io::ErrorKind::Other, e));
                    }
                }
                Ok(Some(Frame::Oversized { length })) => MalformedFrame {
                    channel_id: channel,
                    reason: &format!(
                        "frame of {} bytes exceeds the {} byte limit",
                        length, max_frame_bytes
                    ),
                }
                .log(),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            },
        }
    };

    // Closes the outbound queue, which ends the writer.
    let _ = hub.disconnect(channel);
    if cancel.is_cancelled() {
        writer.abort();
    }
    let _ = writer.await;
    result
}

/// Apply one inbound frame. Malformed frames are logged and skipped.
fn dispatch(hub: &BroadcastHub, channel: ChannelId, frame: &[u8]) -> Result<(), HubError> {
    let frame = frame.trim_ascii();
    if frame.is_empty() {
        return Ok(());
    }

    match serde_json::from_slice::<ClientEvent>(frame) {
        Ok(ClientEvent::JoinDashboard { room_id }) => hub.join(channel, &room_id),
        Ok(ClientEvent::LeaveDashboard { room_id }) => hub.leave(channel, &room_id),
        Ok(ClientEvent::DataUpdate {
            room_id,
            widget_id,
            payload,
        }) => hub.publish(channel, &room_id, &widget_id, payload),
        Err(e) => {
            MalformedFrame {
                channel_id: channel,
                reason: &e.to_string(),
            }
            .log();
            Ok(())
        }
    }
}

async fn write_events(mut writer: OwnedWriteHalf, mut outbound: Outbound) -> io::Result<()> {
    while let Some(event) = outbound.recv().await {
        let mut frame = serde_json::to_vec(&event)?;
        frame.push(b'\n');
        writer.write_all(&frame).await?;
    }
    writer.shutdown().await
}
