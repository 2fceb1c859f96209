//! Upstream platform client
//!
//! The trait the core consumes and the reqwest-backed implementation.

mod client;
mod http;

pub use client::{Relationship, UpstreamClient};
pub use http::HttpUpstream;
