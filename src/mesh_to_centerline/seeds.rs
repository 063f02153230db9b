use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, ProfileResult};
use crate::processing::depth_profile::DepthMidpointTable;

/// Source and target points anchoring an external centerline solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SeedRecord", into = "SeedRecord")]
pub struct SeedPair {
    pub source_depth: i64,
    pub source: Point3<f64>,
    pub target_depth: i64,
    pub target: Point3<f64>,
}

#[derive(Serialize, Deserialize)]
struct SeedRecord {
    source: [f64; 3],
    target: [f64; 3],
    source_depth: i64,
    target_depth: i64,
}

impl From<SeedRecord> for SeedPair {
    fn from(r: SeedRecord) -> Self {
        SeedPair {
            source_depth: r.source_depth,
            source: Point3::from(r.source),
            target_depth: r.target_depth,
            target: Point3::from(r.target),
        }
    }
}

impl From<SeedPair> for SeedRecord {
    fn from(s: SeedPair) -> Self {
        SeedRecord {
            source: [s.source.x, s.source.y, s.source.z],
            target: [s.target.x, s.target.y, s.target.z],
            source_depth: s.source_depth,
            target_depth: s.target_depth,
        }
    }
}

/// How the target depth is chosen from a depth table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedStrategy {
    /// First and last depth.
    #[default]
    Extremes,
    /// Last depth reachable from the first in whole steps, strictly below the last depth.
    Stepped(u32),
}

type Entry<'a> = (i64, &'a Point3<f64>);

/// First and last entries of a table holding at least two depths.
fn extremes(table: &DepthMidpointTable) -> ProfileResult<(Entry<'_>, Entry<'_>)> {
    match (table.first(), table.last()) {
        (Some(first), Some(last)) if table.len() >= 2 => Ok((first, last)),
        _ => Err(ProfileError::Precondition {
            details: format!(
                "seed selection needs at least 2 depths, table has {}",
                table.len()
            ),
        }),
    }
}

/// Uses the shallowest depth as source and the deepest as target.
pub fn select_seeds(table: &DepthMidpointTable) -> ProfileResult<SeedPair> {
    let ((source_depth, source), (target_depth, target)) = extremes(table)?;
    Ok(SeedPair {
        source_depth,
        source: *source,
        target_depth,
        target: *target,
    })
}

/// Samples depths at `first, first + step, ...` below the last depth and seeds
/// from the first and last sample present in the table.
pub fn select_seeds_stepped(table: &DepthMidpointTable, step: u32) -> ProfileResult<SeedPair> {
    if step == 0 {
        return Err(ProfileError::invalid("seed step must be at least 1"));
    }
    let ((source_depth, source), (last_depth, _)) = extremes(table)?;
    let step = step as i64;

    let (target_depth, target) = table
        .iter()
        .filter(|(d, _)| *d > source_depth && *d < last_depth && (d - source_depth) % step == 0)
        .last()
        .ok_or_else(|| ProfileError::Precondition {
            details: format!(
                "no depth between {} and {} lies on a multiple of {} from the source",
                source_depth, last_depth, step
            ),
        })?;

    Ok(SeedPair {
        source_depth,
        source: *source,
        target_depth,
        target: *target,
    })
}

pub fn select_seeds_with(
    table: &DepthMidpointTable,
    strategy: SeedStrategy,
) -> ProfileResult<SeedPair> {
    match strategy {
        SeedStrategy::Extremes => select_seeds(table),
        SeedStrategy::Stepped(step) => select_seeds_stepped(table, step),
    }
}
