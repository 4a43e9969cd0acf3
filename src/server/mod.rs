//! HTTP server: routing, request shaping, error mapping.

pub mod error;
pub mod guide;
pub mod routes;
