//! Remote sources for recorded event streams.

pub mod client;

pub use client::fetch_stream;
