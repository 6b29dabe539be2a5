//! HTTP transport with retry and backoff
//!
//! The transport absorbs transient failures (configured status codes,
//! timeouts, connection errors) with bounded retries and exponential
//! backoff. Everything above this module sees either a successful
//! response or a classified error.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
