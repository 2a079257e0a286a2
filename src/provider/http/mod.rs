//! Shared HTTP utilities for the OAuth and chat endpoints.

mod client;

pub use client::{AuthConfig, ClientOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, HttpClient};
