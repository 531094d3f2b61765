// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Frames of the dashboard channel protocol.
//!
//! Each frame is one JSON object on its own line, discriminated by `event`:
//!
//! ```text
//! client -> server  {"event":"join-dashboard","roomId":"sales"}
//! client -> server  {"event":"leave-dashboard","roomId":"sales"}
//! client -> server  {"event":"data-update","roomId":"sales","widgetId":"w1","payload":[1,2]}
//! server -> client  {"event":"widget-data","widgetId":"w1","payload":[1,2]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames sent by a client to the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinDashboard {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    LeaveDashboard {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    DataUpdate {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "widgetId")]
        widget_id: String,
        #[serde(default)]
        payload: Value,
    },
}

/// Frames sent by the hub to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    WidgetData(WidgetData),
}

/// An update for one widget, as fanned out to room members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetData {
    pub widget_id: String,
    #[serde(default)]
    pub payload: Value,
}
