//! Line codec for the worker's standard streams.
//!
//! The renderer writes console text in whatever code page it was started
//! with, so inbound bytes are decoded lossily instead of failing the stream.
//! A trailing `\r` is stripped. Lines longer than [`MAX_LINE_BYTES`] are cut
//! into chunks of at most that size rather than buffered without bound.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tokio_util::codec::FramedRead;
//! use wallpaper_host::worker::codec::WorkerCodec;
//!
//! let lines = FramedRead::new(child_stdout, WorkerCodec::new());
//! ```

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::{AppError, Result};

/// Maximum line length emitted by the decoder: 1 MiB.
pub const MAX_LINE_BYTES: usize = 1_048_576;

/// Newline-delimited text codec for worker stdio.
#[derive(Debug, Default)]
pub struct WorkerCodec {
    /// Bytes of the buffer already searched for a newline.
    next_index: usize,
}

impl WorkerCodec {
    /// Create a codec with an empty search position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for WorkerCodec {
    type Item = String;
    type Error = AppError;

    /// Decode the next `\n`-terminated line from `src`.
    ///
    /// Returns `Ok(None)` while no complete line is buffered.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let search_end = src.len().min(MAX_LINE_BYTES);
        if let Some(offset) = src[self.next_index..search_end]
            .iter()
            .position(|byte| *byte == b'\n')
        {
            let newline = self.next_index + offset;
            self.next_index = 0;
            let line = src.split_to(newline + 1);
            return Ok(Some(to_text(&line[..newline])));
        }

        if src.len() >= MAX_LINE_BYTES {
            self.next_index = 0;
            let chunk = src.split_to(MAX_LINE_BYTES);
            return Ok(Some(to_text(&chunk)));
        }

        self.next_index = search_end;
        Ok(None)
    }

    /// Emit the unterminated tail of the stream as a final line.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        self.next_index = 0;
        if src.is_empty() {
            return Ok(None);
        }
        let rest = src.split_to(src.len());
        Ok(Some(to_text(&rest)))
    }
}

impl Encoder<String> for WorkerCodec {
    type Error = AppError;

    /// Encode `item` as a `\n`-terminated line.
    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(item.len() + 1);
        dst.extend_from_slice(item.as_bytes());
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}

fn to_text(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

