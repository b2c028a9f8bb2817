// file: src/aggregation/mod.rs
// description: aggregation module exports
// reference: internal module structure

pub mod store;

pub use store::AggregationStore;
