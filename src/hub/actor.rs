// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::errors::HubError;
use crate::hub::rooms::{ChannelId, Rooms};
use crate::model::{ServerEvent, WidgetData};
use crate::observability::messages::hub::{
    ChannelDisconnected, ChannelRegistered, HubStopped, RoomJoined, RoomLeft, UpdateFannedOut,
};
use crate::observability::messages::StructuredLog;

/// Receiving end of a channel's outbound queue.
pub type Outbound = mpsc::UnboundedReceiver<ServerEvent>;

/// Commands processed by the hub task, one at a time.
#[derive(Debug)]
enum HubCommand {
    Register {
        channel: ChannelId,
        peer: String,
        outbound: mpsc::UnboundedSender<ServerEvent>,
    },
    Join {
        channel: ChannelId,
        room_id: String,
    },
    Leave {
        channel: ChannelId,
        room_id: String,
    },
    Publish {
        sender: ChannelId,
        room_id: String,
        widget_id: String,
        payload: Value,
    },
    Disconnect {
        channel: ChannelId,
    },
    MemberCount {
        room_id: String,
        reply: oneshot::Sender<usize>,
    },
    RoomsOf {
        channel: ChannelId,
        reply: oneshot::Sender<Vec<String>>,
    },
}

/// Handle to a running broadcast hub.
///
/// The hub relays widget updates between the channels in a dashboard room.
/// All state lives in one task; every handle method just enqueues a command,
/// so membership changes and fanout happen strictly in the order they were
/// submitted. Handles are cheap to clone and may be shared across connection
/// tasks. Several hubs can run side by side in one process.
///
/// # Example
/// ```no_run
/// use dashboard_relay::hub::BroadcastHub;
/// use serde_json::json;
///
/// # async fn run() -> Result<(), dashboard_relay::errors::HubError> {
/// let hub = BroadcastHub::spawn();
/// let (viewer, mut inbox) = hub.register("viewer")?;
/// let (editor, _) = hub.register("editor")?;
///
/// hub.join(viewer, "sales")?;
/// hub.publish(editor, "sales", "revenue", json!([1, 2, 3]))?;
/// let update = inbox.recv().await;
///
/// hub.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BroadcastHub {
    commands: mpsc::UnboundedSender<HubCommand>,
    next_channel: Arc<AtomicU64>,
    cancel: CancellationToken,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl BroadcastHub {
    /// Start a hub task on the current runtime.
    pub fn spawn() -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(receiver, cancel.clone()));

        Self {
            commands,
            next_channel: Arc::new(AtomicU64::new(1)),
            cancel,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Register a new channel.
    ///
    /// Returns the channel id and the queue of events addressed to it. The
    /// queue closes when the channel is disconnected or the hub stops.
    pub fn register(&self, peer: &str) -> Result<(ChannelId, Outbound), HubError> {
        let channel = self.next_channel.fetch_add(1, Ordering::Relaxed);
        let (outbound, receiver) = mpsc::unbounded_channel();
        self.send(HubCommand::Register {
            channel,
            peer: peer.to_string(),
            outbound,
        })?;
        Ok((channel, receiver))
    }

    /// Add `channel` to `room_id`. Idempotent.
    pub fn join(&self, channel: ChannelId, room_id: &str) -> Result<(), HubError> {
        self.send(HubCommand::Join {
            channel,
            room_id: room_id.to_string(),
        })
    }

    /// Remove `channel` from `room_id`. No-op when it is not a member.
    pub fn leave(&self, channel: ChannelId, room_id: &str) -> Result<(), HubError> {
        self.send(HubCommand::Leave {
            channel,
            room_id: room_id.to_string(),
        })
    }

    /// Deliver `{widget_id, payload}` to every member of `room_id` except `sender`.
    pub fn publish(
        &self,
        sender: ChannelId,
        room_id: &str,
        widget_id: &str,
        payload: Value,
    ) -> Result<(), HubError> {
        self.send(HubCommand::Publish {
            sender,
            room_id: room_id.to_string(),
            widget_id: widget_id.to_string(),
            payload,
        })
    }

    /// Remove `channel` from every room and close its outbound queue.
    pub fn disconnect(&self, channel: ChannelId) -> Result<(), HubError> {
        self.send(HubCommand::Disconnect { channel })
    }

    /// Number of channels in `room_id`, after every command submitted so far.
    pub async fn member_count(&self, room_id: &str) -> Result<usize, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::MemberCount {
            room_id: room_id.to_string(),
            reply,
        })?;
        response.await.map_err(|_| HubError::Stopped)
    }

    /// Rooms `channel` belongs to, sorted.
    pub async fn rooms_of(&self, channel: ChannelId) -> Result<Vec<String>, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::RoomsOf { channel, reply })?;
        response.await.map_err(|_| HubError::Stopped)
    }

    /// Stop the hub task and wait for it to finish.
    ///
    /// Every outbound queue closes; later calls on any handle return
    /// [`HubError::Stopped`].
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!("Broadcast hub task ended abnormally: {}", e);
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled() || self.commands.is_closed()
    }

    fn send(&self, command: HubCommand) -> Result<(), HubError> {
        if self.cancel.is_cancelled() {
            return Err(HubError::Stopped);
        }
        self.commands.send(command).map_err(|_| HubError::Stopped)
    }
}

/// A registered channel as seen by the hub task.
struct Member {
    peer: String,
    outbound: mpsc::UnboundedSender<ServerEvent>,
}

/// Hub task state.
#[derive(Default)]
struct HubState {
    rooms: Rooms,
    channels: HashMap<ChannelId, Member>,
}

impl HubState {
    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register {
                channel,
                peer,
                outbound,
            } => {
                ChannelRegistered {
                    channel_id: channel,
                    peer: &peer,
                }
                .log();
                self.channels.insert(channel, Member { peer, outbound });
            }
            HubCommand::Join { channel, room_id } => {
                // Commands from a channel that already disconnected are dropped.
                if !self.channels.contains_key(&channel) {
                    return;
                }
                let member_count = self.rooms.join(channel, &room_id);
                RoomJoined {
                    channel_id: channel,
                    room_id: &room_id,
                    member_count,
                }
                .log();
            }
            HubCommand::Leave { channel, room_id } => {
                let member_count = self.rooms.leave(channel, &room_id);
                RoomLeft {
                    channel_id: channel,
                    room_id: &room_id,
                    member_count,
                }
                .log();
            }
            HubCommand::Publish {
                sender,
                room_id,
                widget_id,
                payload,
            } => self.publish(sender, &room_id, widget_id, payload),
            HubCommand::Disconnect { channel } => self.disconnect(channel),
            HubCommand::MemberCount { room_id, reply } => {
                let _ = reply.send(self.rooms.member_count(&room_id));
            }
            HubCommand::RoomsOf { channel, reply } => {
                let _ = reply.send(self.rooms.rooms_of(channel));
            }
        }
    }

    fn publish(&mut self, sender: ChannelId, room_id: &str, widget_id: String, payload: Value) {
        let event = ServerEvent::WidgetData(WidgetData { widget_id, payload });
        let mut delivered = 0;
        let mut gone = Vec::new();

        for recipient in self.rooms.recipients(sender, room_id) {
            match self.channels.get(&recipient) {
                Some(member) if member.outbound.send(event.clone()).is_ok() => delivered += 1,
                _ => gone.push(recipient),
            }
        }

        let ServerEvent::WidgetData(data) = &event;
        UpdateFannedOut {
            sender_id: sender,
            room_id,
            widget_id: &data.widget_id,
            recipient_count: delivered,
        }
        .log();

        // A closed queue means the connection is gone even if its disconnect
        // has not arrived yet.
        for channel in gone {
            self.disconnect(channel);
        }
    }

    fn disconnect(&mut self, channel: ChannelId) {
        let rooms_left = self.rooms.disconnect(channel);
        if self.channels.remove(&channel).is_some() {
            ChannelDisconnected {
                channel_id: channel,
                rooms_left,
            }
            .log();
        }
    }
}

async fn run(mut commands: mpsc::UnboundedReceiver<HubCommand>, cancel: CancellationToken) {
    let mut state = HubState::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(command) => state.handle(command),
                None => break,
            },
        }
    }

    commands.close();
    HubStopped {
        channel_count: state.channels.len(),
        room_count: state.rooms.room_count(),
    }
    .log();
    for (channel, member) in state.channels.drain() {
        tracing::debug!(channel_id = channel, peer = %member.peer, "Releasing channel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn expect_nothing(outbound: &mut Outbound) {
        assert!(
            timeout(Duration::from_millis(100), outbound.recv()).await.is_err(),
            "channel should not have received anything"
        );
    }

    fn widget(widget_id: &str, payload: Value) -> ServerEvent {
        ServerEvent::WidgetData(WidgetData {
            widget_id: widget_id.to_string(),
            payload,
        })
    }

    #[tokio::test]
    async fn test_publish_reaches_members_but_not_sender() {
        let hub = BroadcastHub::spawn();
        let (a, mut a_out) = hub.register("a").unwrap();
        let (b, mut b_out) = hub.register("b").unwrap();
        let (_c, mut c_out) = hub.register("c").unwrap();

        hub.join(a, "d").unwrap();
        hub.join(b, "d").unwrap();
        hub.publish(a, "d", "w1", json!({"v": 1})).unwrap();

        assert_eq!(b_out.recv().await, Some(widget("w1", json!({"v": 1}))));
        expect_nothing(&mut a_out).await;
        expect_nothing(&mut c_out).await;
        hub.shutdown().await;
    }

    #[tokio::test]
    async fn test_non_member_may_publish() {
        let hub = BroadcastHub::spawn();
        let (viewer, mut viewer_out) = hub.register("viewer").unwrap();
        let (outsider, _) = hub.register("outsider").unwrap();

        hub.join(viewer, "d").unwrap();
        hub.publish(outsider, "d", "w1", json!(7)).unwrap();

        assert_eq!(viewer_out.recv().await, Some(widget("w1", json!(7))));
        assert_eq!(hub.member_count("d").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_join_twice_then_leave_once_exits_room() {
        let hub = BroadcastHub::spawn();
        let (a, mut a_out) = hub.register("a").unwrap();
        let (b, _) = hub.register("b").unwrap();

        hub.join(a, "d").unwrap();
        hub.join(a, "d").unwrap();
        hub.leave(a, "d").unwrap();
        hub.publish(b, "d", "w1", json!(1)).unwrap();

        assert_eq!(hub.member_count("d").await.unwrap(), 0);
        assert!(hub.rooms_of(a).await.unwrap().is_empty());
        expect_nothing(&mut a_out).await;
    }

    #[tokio::test]
    async fn test_disconnect_drops_member_and_closes_queue() {
        let hub = BroadcastHub::spawn();
        let (a, mut a_out) = hub.register("a").unwrap();
        let (b, mut b_out) = hub.register("b").unwrap();
        let (c, _) = hub.register("c").unwrap();
        hub.join(a, "d").unwrap();
        hub.join(a, "e").unwrap();
        hub.join(b, "d").unwrap();
        assert_eq!(hub.member_count("d").await.unwrap(), 2);

        hub.disconnect(a).unwrap();
        // late commands from the disconnected channel are ignored
        hub.join(a, "d").unwrap();
        hub.publish(c, "d", "w1", json!(1)).unwrap();

        assert_eq!(hub.member_count("d").await.unwrap(), 1);
        assert_eq!(hub.member_count("e").await.unwrap(), 0);
        assert_eq!(b_out.recv().await, Some(widget("w1", json!(1))));
        assert_eq!(a_out.recv().await, None);
    }

    #[tokio::test]
    async fn test_updates_arrive_in_publish_order() {
        let hub = BroadcastHub::spawn();
        let (sender, _) = hub.register("sender").unwrap();
        let (viewer, mut viewer_out) = hub.register("viewer").unwrap();
        hub.join(viewer, "d").unwrap();

        for i in 0..50 {
            hub.publish(sender, "d", "w1", json!(i)).unwrap();
        }

        for i in 0..50 {
            assert_eq!(viewer_out.recv().await, Some(widget("w1", json!(i))));
        }
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned_on_publish() {
        let hub = BroadcastHub::spawn();
        let (a, a_out) = hub.register("a").unwrap();
        let (b, _) = hub.register("b").unwrap();
        hub.join(a, "d").unwrap();
        drop(a_out);

        hub.publish(b, "d", "w1", json!(1)).unwrap();

        assert_eq!(hub.member_count("d").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_later_commands() {
        let hub = BroadcastHub::spawn();
        let (a, mut a_out) = hub.register("a").unwrap();
        hub.join(a, "d").unwrap();

        hub.shutdown().await;

        assert!(hub.is_stopped());
        assert_eq!(a_out.recv().await, None);
        assert_eq!(hub.join(a, "d"), Err(HubError::Stopped));
        assert!(hub.register("late").is_err());
        assert_eq!(hub.member_count("d").await, Err(HubError::Stopped));
    }

    #[tokio::test]
    async fn test_hubs_are_independent() {
        let first = BroadcastHub::spawn();
        let second = BroadcastHub::spawn();
        let (a, _) = first.register("a").unwrap();
        let (b, _) = second.register("b").unwrap();

        first.join(a, "d").unwrap();
        second.join(b, "d").unwrap();
        first.shutdown().await;

        assert_eq!(second.member_count("d").await.unwrap(), 1);
    }
}
