//! Client Module
//!
//! HTTP transport for the API.

pub mod http;

pub use http::{ByteStream, HttpClient};
