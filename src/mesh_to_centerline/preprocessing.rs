use anyhow::Context;
use std::path::Path;

use super::seeds::{select_seeds_with, SeedPair, SeedStrategy};
use crate::config::SeedConfig;
use crate::io::input::read_depth_table;

pub fn seeds_from_config(config: &SeedConfig) -> SeedStrategy {
    match config.step {
        Some(step) => SeedStrategy::Stepped(step),
        None => SeedStrategy::Extremes,
    }
}

/// Loads a vessel's depth metadata and picks the seeds for its centerline.
pub fn prepare_seed_points<P: AsRef<Path>>(
    metadata_path: P,
    strategy: SeedStrategy,
) -> anyhow::Result<SeedPair> {
    let metadata_path = metadata_path.as_ref();
    let table = read_depth_table(metadata_path)?;
    let seeds = select_seeds_with(&table, strategy)
        .with_context(|| format!("selecting seeds from {}", metadata_path.display()))?;
    log::debug!(
        "Seeds from {:?}: source depth {} {:?}, target depth {} {:?}",
        metadata_path,
        seeds.source_depth,
        seeds.source,
        seeds.target_depth,
        seeds.target
    );
    Ok(seeds)
}
