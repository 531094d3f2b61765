// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Newline-delimited framing for the dashboard channel.
//!
//! Frames are read as raw bytes so that bytes which are not UTF-8 surface as
//! an undecodable frame instead of a stream error. Frames longer than the
//! limit are discarded up to the next newline without being buffered.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// One newline-delimited unit read from a channel stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Frame bytes without the trailing newline.
    Line(Vec<u8>),
    /// A frame that exceeded the limit and was dropped.
    Oversized { length: usize },
}

pub struct FrameReader<R> {
    reader: BufReader<R>,
    max_frame_bytes: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, max_frame_bytes: usize) -> Self {
        Self {
            reader: BufReader::new(inner),
            max_frame_bytes,
        }
    }

    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }

    /// Read the next frame. A final frame without a newline is still
    /// returned; `Ok(None)` means the stream ended.
    ///
    /// Cancel safe only between frames: dropping the future mid-frame loses
    /// the bytes consumed so far.
    pub async fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        let mut frame = Vec::new();
        let mut length = 0usize;
        let mut oversized = false;

        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(match (length, oversized) {
                    (0, _) => None,
                    (_, true) => Some(Frame::Oversized { length }),
                    (_, false) => Some(Frame::Line(frame)),
                });
            }

            let newline = available.iter().position(|b| *b == b'\n');
            let (content, consumed) = match newline {
                Some(index) => (&available[..index], index + 1),
                None => (available, available.len()),
            };

            length += content.len();
            if length > self.max_frame_bytes {
                oversized = true;
                frame = Vec::new();
            } else {
                frame.extend_from_slice(content);
            }
            self.reader.consume(consumed);

            if newline.is_some() {
                return Ok(Some(if oversized {
                    Frame::Oversized { length }
                } else {
                    Frame::Line(frame)
                }));
            }
        }
    }
}
