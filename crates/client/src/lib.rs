//! Network client for guichet.
//!
//! This crate provides the fetch side of the offline cache proxy: the
//! `Fetch` trait the proxy is injected with, a reqwest-backed
//! implementation, and URL canonicalization.

pub mod fetch;

pub use fetch::{Fetch, FetchConfig, FetchedResponse, HttpFetcher, RequestMode, ResponseKind};
