// file: src/enrichment/mod.rs
// description: ip enrichment module exports
// reference: internal module structure

pub mod backend;
pub mod client;

pub use backend::{IpInfoBackend, LookupBackend, read_token};
pub use client::EnrichmentClient;
