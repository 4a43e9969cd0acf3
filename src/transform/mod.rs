//! Upstream event-stream to plain-text translation.
//!
//! The upstream inference service emits newline-delimited, `data: `-prefixed
//! records carrying JSON fragments. This module turns that framing into a
//! flat stream of generated text bytes.

pub mod line;
pub mod transformer;

pub use line::LineEvent;
pub use transformer::{into_text_stream, StreamTransformer};
