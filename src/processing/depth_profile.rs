use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::axis::{Axis, Bounds};
use super::centroid;
use crate::error::{Band, ProfileError, ProfileResult};
use crate::io::PointCloud;

pub const DEFAULT_STRIDE: u32 = 2;
pub const DEFAULT_BAND_HALF_WIDTH: u32 = 1;

/// What to do with a depth whose band holds no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyBandPolicy {
    /// Leave the depth out of the table.
    #[default]
    Skip,
    /// Abort with `ProfileError::EmptyBand`.
    Fail,
}

/// Serialised form of a depth table: depth -> `[x, y, z]`.
pub type DepthMap = BTreeMap<i64, [f64; 3]>;

/// Cross-sectional centroids keyed by integer depth along one axis.
///
/// Iteration is always in ascending depth order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "DepthMap", into = "DepthMap")]
pub struct DepthMidpointTable {
    entries: BTreeMap<i64, Point3<f64>>,
}

impl DepthMidpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, depth: i64, midpoint: Point3<f64>) -> Option<Point3<f64>> {
        self.entries.insert(depth, midpoint)
    }

    pub fn get(&self, depth: i64) -> Option<&Point3<f64>> {
        self.entries.get(&depth)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depths(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &Point3<f64>)> + '_ {
        self.entries.iter().map(|(&d, p)| (d, p))
    }

    pub fn first(&self) -> Option<(i64, &Point3<f64>)> {
        self.entries.iter().next().map(|(&d, p)| (d, p))
    }

    pub fn last(&self) -> Option<(i64, &Point3<f64>)> {
        self.entries.iter().next_back().map(|(&d, p)| (d, p))
    }
}

impl From<DepthMap> for DepthMidpointTable {
    fn from(map: DepthMap) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(d, [x, y, z])| (d, Point3::new(x, y, z)))
                .collect(),
        }
    }
}

impl From<DepthMidpointTable> for DepthMap {
    fn from(table: DepthMidpointTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(d, p)| (d, [p.x, p.y, p.z]))
            .collect()
    }
}

impl FromIterator<(i64, Point3<f64>)> for DepthMidpointTable {
    fn from_iter<I: IntoIterator<Item = (i64, Point3<f64>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn in_band(coord: f64, depth: f64, half_width: f64) -> bool {
    if half_width == 0.0 {
        coord == depth
    } else {
        (coord - depth).abs() < half_width
    }
}

/// Slices the cloud into bands along `axis` and records each band's centroid.
///
/// Depths run from `floor(min)` up to, but excluding, `ceil(max)` in steps of
/// `stride`. A point belongs to the band at depth `d` when its axis coordinate
/// lies strictly within `band_half_width` of `d`; with a half-width of zero only
/// points exactly on `d` count.
pub fn compute_depth_profile(
    cloud: &PointCloud,
    axis: Axis,
    stride: u32,
    band_half_width: u32,
    on_empty: EmptyBandPolicy,
) -> ProfileResult<DepthMidpointTable> {
    if stride == 0 {
        return Err(ProfileError::invalid("depth stride must be at least 1"));
    }
    let bounds = Bounds::of(cloud)?;
    let idx = axis.index();
    let first_depth = bounds.min_along(axis).floor() as i64;
    let end_depth = bounds.max_along(axis).ceil() as i64;
    let half_width = band_half_width as f64;

    let mut table = DepthMidpointTable::new();
    for depth in (first_depth..end_depth).step_by(stride as usize) {
        let band = cloud
            .points()
            .iter()
            .filter(|p| in_band(p[idx], depth as f64, half_width));
        match centroid(band) {
            Some(midpoint) => {
                debug!(
                    "Depth: {}, Midpoint: [{:.2}, {:.2}, {:.2}]",
                    depth, midpoint.x, midpoint.y, midpoint.z
                );
                table.insert(depth, midpoint);
            }
            None => match on_empty {
                EmptyBandPolicy::Skip => {
                    debug!("Depth: {} on {} axis has no points, skipped", depth, axis);
                }
                EmptyBandPolicy::Fail => {
                    return Err(ProfileError::EmptyBand {
                        band: Band::Depth(depth),
                    });
                }
            },
        }
    }
    Ok(table)
}
