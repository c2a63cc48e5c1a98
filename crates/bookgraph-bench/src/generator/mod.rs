//! Relation generator.
//!
//! Produces relation lists shaped like a catalogue of books: a number of
//! independent roots, each expanded into a layered tree, with cross-root
//! fan-in edges and optional back-edges that close cycles.

pub mod topology;

use bookgraph_core::Relation;
use rand::SeedableRng;
use rand::rngs::StdRng;

use topology::build_layered_forest;

/// Configuration for the relation generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of root nodes.
    pub num_roots: usize,
    /// Number of levels below each root.
    pub depth: usize,
    /// Maximum children per node; each node gets between 1 and this many.
    pub branching_factor: usize,
    /// Probability (0.0-1.0) that a non-root node gets one extra parent on
    /// a shallower level, usually under another root.
    pub fan_in_density: f64,
    /// Whether to add back-edges closing cycles under some roots.
    pub inject_cycles: bool,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// ~5 roots, ~70 nodes
    Small,
    /// ~20 roots, ~1200 nodes
    Medium,
    /// ~50 roots, ~20000 nodes
    Large,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                num_roots: 5,
                depth: 3,
                branching_factor: 3,
                fan_in_density: 0.1,
                inject_cycles: false,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                num_roots: 20,
                depth: 5,
                branching_factor: 3,
                fan_in_density: 0.15,
                inject_cycles: false,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                num_roots: 50,
                depth: 6,
                branching_factor: 4,
                fan_in_density: 0.15,
                inject_cycles: false,
            },
        }
    }
}

/// Generates a relation list from the given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`. Node ids start
/// at 1, so no generated id is blank.
pub fn generate_relations(config: &GeneratorConfig) -> Vec<Relation<u32>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    build_layered_forest(config, &mut rng)
}
