// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::listeners::{dispatch, ListenerId, ListenerRegistry, WidgetListener};
use crate::config::consts::DEFAULT_MAX_FRAME_BYTES;
use crate::errors::ChannelError;
use crate::model::{ClientEvent, Frame, FrameReader, ServerEvent};
use crate::observability::messages::channel::{
    ClientConnected, ClientDisconnected, UnreadableServerFrame,
};
use crate::observability::messages::StructuredLog;

/// One client session with a dashboard hub.
///
/// Holds at most one connection and a widget listener registry. The registry
/// belongs to the session, not the connection: listeners survive
/// [`disconnect`](Self::disconnect) and start receiving again after the next
/// [`connect_once`](Self::connect_once). Room memberships do not survive; the
/// hub drops them with the connection.
///
/// # Example
/// ```no_run
/// use dashboard_relay::client::ClientChannel;
/// use serde_json::{json, Value};
///
/// # async fn run() -> Result<(), dashboard_relay::errors::ChannelError> {
/// let mut channel = ClientChannel::new("127.0.0.1:5001");
/// channel.add_widget_listener("revenue", |payload: &Value| {
///     println!("revenue now {}", payload);
///     Ok(())
/// });
///
/// channel.connect_once().await?;
/// channel.join_dashboard("sales").await?;
/// channel.send_data_update("sales", "revenue", json!([1, 2, 3])).await?;
/// channel.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct ClientChannel {
    addr: String,
    max_frame_bytes: usize,
    listeners: Arc<Mutex<ListenerRegistry>>,
    connection: Option<Connection>,
}

struct Connection {
    writer: OwnedWriteHalf,
    reader: JoinHandle<()>,
    cancel: CancellationToken,
}

impl ClientChannel {
    /// Create a disconnected session for the hub at `addr`.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            listeners: Arc::new(Mutex::new(ListenerRegistry::new())),
            connection: None,
        }
    }

    /// Cap on inbound frame length; longer frames from the hub are skipped.
    /// Applies from the next connect.
    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// `true` while a connection is open and the hub has not closed it.
    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| !connection.reader.is_finished())
    }

    /// Connect if not already connected. Calling it again is a no-op.
    pub async fn connect_once(&mut self) -> Result<(), ChannelError> {
        if self.is_connected() {
            return Ok(());
        }
        // The hub may have closed a previous connection.
        if let Some(stale) = self.connection.take() {
            stale.cancel.cancel();
        }

        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|source| ChannelError::Connect {
                addr: self.addr.clone(),
                source,
            })?;
        let (read_half, writer) = stream.into_split();

        let cancel = CancellationToken::new();
        let reader = tokio::spawn(read_events(
            FrameReader::new(read_half, self.max_frame_bytes),
            self.addr.clone(),
            self.listeners.clone(),
            cancel.clone(),
        ));

        ClientConnected { addr: &self.addr }.log();
        self.connection = Some(Connection {
            writer,
            reader,
            cancel,
        });
        Ok(())
    }

    pub async fn join_dashboard(&mut self, room_id: &str) -> Result<(), ChannelError> {
        self.send(&ClientEvent::JoinDashboard {
            room_id: room_id.to_string(),
        })
        .await
    }

    pub async fn leave_dashboard(&mut self, room_id: &str) -> Result<(), ChannelError> {
        self.send(&ClientEvent::LeaveDashboard {
            room_id: room_id.to_string(),
        })
        .await
    }

    /// Publish a widget update to every other member of `room_id`.
    pub async fn send_data_update(
        &mut self,
        room_id: &str,
        widget_id: &str,
        payload: Value,
    ) -> Result<(), ChannelError> {
        self.send(&ClientEvent::DataUpdate {
            room_id: room_id.to_string(),
            widget_id: widget_id.to_string(),
            payload,
        })
        .await
    }

    /// Register `listener` for `widget_id`.
    pub fn add_widget_listener<F>(&self, widget_id: &str, listener: F) -> ListenerId
    where
        F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let listener: WidgetListener = Arc::new(listener);
        lock(&self.listeners).add(widget_id, listener)
    }

    /// Remove one listener. Returns `false` when it was not registered.
    pub fn remove_widget_listener(&self, widget_id: &str, id: ListenerId) -> bool {
        lock(&self.listeners).remove(widget_id, id)
    }

    pub fn listener_count(&self, widget_id: &str) -> usize {
        lock(&self.listeners).listener_count(widget_id)
    }

    /// Close the connection, if any. Listeners are kept.
    pub async fn disconnect(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };
        connection.cancel.cancel();
        let _ = connection.writer.shutdown().await;
        let _ = connection.reader.await;

        ClientDisconnected {
            addr: &self.addr,
            initiated_locally: true,
        }
        .log();
    }

    async fn send(&mut self, event: &ClientEvent) -> Result<(), ChannelError> {
        if !self.is_connected() {
            return Err(ChannelError::NotConnected);
        }
        let connection = self.connection.as_mut().ok_or(ChannelError::NotConnected)?;

        let mut frame = serde_json::to_vec(event)?;
        frame.push(b'\n');
        connection.writer.write_all(&frame).await?;
        Ok(())
    }
}

impl Drop for ClientChannel {
    fn drop(&mut self) {
        if let Some(connection) = &self.connection {
            connection.cancel.cancel();
        }
    }
}

fn lock(registry: &Mutex<ListenerRegistry>) -> MutexGuard<'_, ListenerRegistry> {
    // Listeners never run under this lock, so a poisoned guard still holds a
    // consistent registry.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn read_events(
    mut frames: FrameReader<OwnedReadHalf>,
    addr: String,
    listeners: Arc<Mutex<ListenerRegistry>>,
    cancel: CancellationToken,
) {
    let max_frame_bytes = frames.max_frame_bytes();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            frame = frames.next_frame() => match frame {
                Ok(Some(Frame::Line(bytes))) => deliver(bytes.trim_ascii(), &listeners),
                Ok(Some(Frame::Oversized { length })) => UnreadableServerFrame {
                    reason: &format!(
                        "frame of {} bytes exceeds the {} byte limit",
                        length, max_frame_bytes
                    ),
                }
                .log(),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(addr = %addr, error = %e, "Dashboard channel read failed");
                    break;
                }
            },
        }
    }

    ClientDisconnected {
        addr: &addr,
        initiated_locally: false,
    }
    .log();
}

fn deliver(frame: &[u8], listeners: &Mutex<ListenerRegistry>) {
    if frame.is_empty() {
        return;
    }
    match serde_json::from_slice::<ServerEvent>(frame) {
        Ok(ServerEvent::WidgetData(data)) => {
            let snapshot = lock(listeners).snapshot(&data.widget_id);
            dispatch(&data.widget_id, &snapshot, &data.payload);
        }
        Err(e) => UnreadableServerFrame {
            reason: &e.to_string(),
        }
        .log(),
    }
}
