//! Topology strategies: per-root layered trees, fan-in overlay, and
//! optional cycle injection.

use bookgraph_core::Relation;
use rand::Rng;
use rand::rngs::StdRng;

use super::GeneratorConfig;

/// Builds the full relation list from the generator configuration.
///
/// Tree edges come first, grouped by root, followed by fan-in edges and
/// then any injected back-edges.
pub fn build_layered_forest(config: &GeneratorConfig, rng: &mut StdRng) -> Vec<Relation<u32>> {
    let mut relations: Vec<Relation<u32>> = Vec::new();
    let mut next_id: u32 = 1;
    // levels[l] holds every node at distance l from its root, across roots.
    let mut levels: Vec<Vec<u32>> = vec![Vec::new(); config.depth + 1];

    for _ in 0..config.num_roots {
        let root = take_id(&mut next_id);
        levels[0].push(root);
        build_tree(rng, root, config, &mut next_id, &mut levels, &mut relations);
    }

    add_fan_in(rng, config, &levels, &mut relations);

    if config.inject_cycles {
        inject_cycles(rng, &levels, &mut relations);
    }

    relations
}

fn take_id(next_id: &mut u32) -> u32 {
    let id = *next_id;
    *next_id += 1;
    id
}

fn build_tree(
    rng: &mut StdRng,
    root: u32,
    config: &GeneratorConfig,
    next_id: &mut u32,
    levels: &mut [Vec<u32>],
    relations_out: &mut Vec<Relation<u32>>,
) {
    let branching = config.branching_factor.max(1);
    let mut frontier = vec![root];

    for level in 1..=config.depth {
        let mut next_frontier = Vec::new();
        for &parent in &frontier {
            let num_children = rng.gen_range(1..=branching);
            for _ in 0..num_children {
                let child = take_id(next_id);
                relations_out.push(Relation::new(parent, child));
                levels[level].push(child);
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }
}

/// Gives some non-root nodes a second parent on a strictly shallower level.
///
/// Every edge still points from a lower level to a higher one, so the
/// overlay never closes a cycle.
fn add_fan_in(
    rng: &mut StdRng,
    config: &GeneratorConfig,
    levels: &[Vec<u32>],
    relations_out: &mut Vec<Relation<u32>>,
) {
    if config.fan_in_density <= 0.0 {
        return;
    }
    let density = config.fan_in_density.min(1.0);

    for (level, nodes) in levels.iter().enumerate().skip(1) {
        for &child in nodes {
            if !rng.gen_bool(density) {
                continue;
            }
            let parent_level = rng.gen_range(0..level);
            let candidates = &levels[parent_level];
            if candidates.is_empty() {
                continue;
            }
            let parent = candidates[rng.gen_range(0..candidates.len())];
            relations_out.push(Relation::new(parent, child));
        }
    }
}

/// Adds 1 to 3 back-edges from a node to one of its tree parents.
///
/// Only edges whose parent is itself below a root are reversed, so every
/// injected cycle hangs beneath some root and rejects it.
fn inject_cycles(rng: &mut StdRng, levels: &[Vec<u32>], relations_out: &mut Vec<Relation<u32>>) {
    let below_root: Vec<(u32, u32)> = relations_out
        .iter()
        .filter(|r| !levels[0].contains(&r.parent))
        .map(|r| (r.parent, r.child))
        .collect();
    if below_root.is_empty() {
        return;
    }

    let num_cycles = rng.gen_range(1..=3);
    for _ in 0..num_cycles {
        let (parent, child) = below_root[rng.gen_range(0..below_root.len())];
        relations_out.push(Relation::new(child, parent));
    }
}
