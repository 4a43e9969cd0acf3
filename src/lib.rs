//! chat-relay: HTTP gateway in front of a hosted LLM inference service.
//!
//! Forwards chat requests upstream and returns either a complete JSON
//! response or a live token stream translated from the upstream
//! event-stream framing into plain UTF-8 text.

pub mod config;
pub mod server;
pub mod transform;
pub mod upstream;
