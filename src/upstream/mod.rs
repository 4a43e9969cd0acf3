//! Client for the hosted inference service.

pub mod client;

pub use client::{ChatMessage, UpstreamClient, UpstreamError};
