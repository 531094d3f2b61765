// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Room membership state.
//!
//! Pure bookkeeping with no I/O: the hub actor owns one [`Rooms`] and is the
//! only thing that mutates it, so each event's membership change and fanout
//! target set are computed against a consistent view.

use std::collections::{BTreeSet, HashMap};

/// Identifier of a connected channel within one hub.
pub type ChannelId = u64;

/// Mapping from room id to the channels currently in it.
///
/// A room exists only while it has members. Membership is tracked in both
/// directions so removing a channel never has to scan every room.
#[derive(Debug, Default)]
pub struct Rooms {
    members: HashMap<String, BTreeSet<ChannelId>>,
    memberships: HashMap<ChannelId, BTreeSet<String>>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `channel` to `room_id`. Joining twice is a no-op.
    ///
    /// Returns the room's member count afterwards.
    pub fn join(&mut self, channel: ChannelId, room_id: &str) -> usize {
        let members = self.members.entry(room_id.to_string()).or_default();
        members.insert(channel);
        self.memberships
            .entry(channel)
            .or_default()
            .insert(room_id.to_string());
        members.len()
    }

    /// Remove `channel` from `room_id`. Leaving a room not joined is a no-op.
    ///
    /// Returns the room's member count afterwards.
    pub fn leave(&mut self, channel: ChannelId, room_id: &str) -> usize {
        if let Some(rooms) = self.memberships.get_mut(&channel) {
            rooms.remove(room_id);
            if rooms.is_empty() {
                self.memberships.remove(&channel);
            }
        }

        let Some(members) = self.members.get_mut(room_id) else {
            return 0;
        };
        members.remove(&channel);
        let remaining = members.len();
        if remaining == 0 {
            self.members.remove(room_id);
        }
        remaining
    }

    /// Remove `channel` from every room. Returns how many rooms it was in.
    pub fn disconnect(&mut self, channel: ChannelId) -> usize {
        let Some(rooms) = self.memberships.remove(&channel) else {
            return 0;
        };
        for room_id in &rooms {
            if let Some(members) = self.members.get_mut(room_id) {
                members.remove(&channel);
                if members.is_empty() {
                    self.members.remove(room_id);
                }
            }
        }
        rooms.len()
    }

    /// Channels that should receive a publish from `sender` to `room_id`.
    ///
    /// The sender is never included, whether or not it is a member.
    pub fn recipients(&self, sender: ChannelId, room_id: &str) -> Vec<ChannelId> {
        self.members
            .get(room_id)
            .map(|members| {
                members
                    .iter()
                    .copied()
                    .filter(|member| *member != sender)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn member_count(&self, room_id: &str) -> usize {
        self.members.get(room_id).map_or(0, BTreeSet::len)
    }

    /// Rooms `channel` is currently in, sorted.
    pub fn rooms_of(&self, channel: ChannelId) -> Vec<String> {
        self.memberships
            .get(&channel)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_is_idempotent() {
        let mut rooms = Rooms::new();
        assert_eq!(rooms.join(1, "d"), 1);
        assert_eq!(rooms.join(1, "d"), 1);
        assert_eq!(rooms.leave(1, "d"), 0);

        assert_eq!(rooms.member_count("d"), 0);
        assert!(rooms.rooms_of(1).is_empty());
        assert_eq!(rooms.room_count(), 0);
    }

    #[test]
    fn test_leave_unjoined_room_is_noop() {
        let mut rooms = Rooms::new();
        rooms.join(1, "a");

        assert_eq!(rooms.leave(1, "b"), 0);
        assert_eq!(rooms.leave(2, "a"), 1);
        assert_eq!(rooms.rooms_of(1), vec!["a".to_string()]);
    }

    #[test]
    fn test_recipients_exclude_sender() {
        let mut rooms = Rooms::new();
        rooms.join(1, "d");
        rooms.join(2, "d");
        rooms.join(3, "d");
        rooms.join(4, "other");

        assert_eq!(rooms.recipients(2, "d"), vec![1, 3]);
        // a non-member may publish; every member receives it
        assert_eq!(rooms.recipients(4, "d"), vec![1, 2, 3]);
        assert!(rooms.recipients(1, "empty").is_empty());
    }

    #[test]
    fn test_disconnect_removes_every_membership() {
        let mut rooms = Rooms::new();
        rooms.join(1, "a");
        rooms.join(1, "b");
        rooms.join(2, "a");

        assert_eq!(rooms.disconnect(1), 2);

        assert_eq!(rooms.member_count("a"), 1);
        assert_eq!(rooms.member_count("b"), 0);
        assert_eq!(rooms.room_count(), 1);
        assert!(rooms.recipients(2, "a").is_empty());
        assert_eq!(rooms.disconnect(1), 0);
    }
}
