//! Incremental byte-stream transformer.
//!
//! Consumes raw chunks from the upstream event-stream (chunk boundaries are
//! unrelated to line boundaries) and produces plain UTF-8 text bytes with all
//! framing stripped. One transformer per stream; state is a byte buffer
//! holding the unresolved tail plus a done flag.

use std::convert::Infallible;

use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt};
use tracing::warn;

use crate::transform::line::{parse_flush_line, parse_line, LineEvent};

/// Per-stream transformation state.
///
/// Lines are split on raw bytes and only complete lines are decoded, so a
/// multi-byte UTF-8 character split across chunk boundaries is never
/// corrupted: its bytes simply wait in the buffer until the line completes.
#[derive(Debug, Default)]
pub struct StreamTransformer {
    buf: BytesMut,
    done: bool,
}

impl StreamTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one upstream chunk; returns the concatenated text extracted from
    /// every line completed by this chunk. Empty result means no text yet.
    ///
    /// After the `[DONE]` sentinel has been seen, all further input is
    /// ignored, including the rest of the chunk that carried it.
    pub fn push(&mut self, chunk: &[u8]) -> Bytes {
        if self.done {
            return Bytes::new();
        }

        self.buf.extend_from_slice(chunk);

        let mut out = BytesMut::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.split_to(pos + 1);
            match parse_line(&String::from_utf8_lossy(&line)) {
                LineEvent::Text(text) => out.extend_from_slice(text.as_bytes()),
                LineEvent::Done => {
                    self.done = true;
                    self.buf.clear();
                    break;
                }
                LineEvent::Skip => {}
            }
        }

        out.freeze()
    }

    /// Flush the residual (unterminated) line at end of stream. Call once;
    /// subsequent calls return `None`.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.done {
            return None;
        }
        self.done = true;

        if self.buf.is_empty() {
            return None;
        }
        let tail = self.buf.split();
        parse_flush_line(&String::from_utf8_lossy(&tail))
            .map(|text| Bytes::copy_from_slice(text.as_bytes()))
    }
}

/// Adapt a fallible upstream byte stream into an infallible plain-text stream.
///
/// Pull-based: one upstream chunk is consumed per poll round, so downstream
/// backpressure propagates and only the line remainder is ever buffered.
/// A transport error mid-stream ends the output after the final flush; bad
/// frames never abort the stream.
pub fn into_text_stream<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, Infallible>>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    futures::stream::unfold(
        (upstream, StreamTransformer::new(), false),
        |(mut upstream, mut transformer, finished)| async move {
            if finished {
                return None;
            }
            loop {
                match upstream.next().await {
                    Some(Ok(chunk)) => {
                        let out = transformer.push(&chunk);
                        if !out.is_empty() {
                            return Some((Ok(out), (upstream, transformer, false)));
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Upstream stream error: {e}");
                        let tail = transformer.finish();
                        return tail.map(|t| (Ok(t), (upstream, transformer, true)));
                    }
                    None => {
                        let tail = transformer.finish();
                        return tail.map(|t| (Ok(t), (upstream, transformer, true)));
                    }
                }
            }
        },
    )
}
