//! HTTP/SSE surface
//!
//! Thin I/O over the engine: routing, request/response shapes, and the SSE
//! event stream. All domain decisions live in `risk`, `vision`, and
//! `alerts`.

pub mod handlers;
pub mod server;
pub mod sse;
