//! Relation generator and benchmark utilities for bookgraph.
//!
//! This crate provides deterministic generation of layered relation sets
//! for benchmarking and property-based testing of `bookgraph-core`.

pub mod correctness;
pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, generate_relations};
