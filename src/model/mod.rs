// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod data_source;
mod events;
mod frames;

pub use data_source::{
    normalize_name, DataSource, DataSourcePatch, DataSourceRecord, HttpMethod, NewDataSource,
    RemoteApiConfig, SourceConfig, SourceKind, StaticConfig, DEFAULT_REFRESH_INTERVAL_SECS,
};
pub use events::{ClientEvent, ServerEvent, WidgetData};
pub use frames::{Frame, FrameReader};
