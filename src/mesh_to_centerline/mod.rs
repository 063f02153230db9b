pub mod preprocessing;
pub mod seeds;

pub use preprocessing::{prepare_seed_points, seeds_from_config};
pub use seeds::{select_seeds, select_seeds_stepped, select_seeds_with, SeedPair, SeedStrategy};
