pub mod axis;
pub mod depth_profile;
pub mod end_regions;

use log::debug;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, ProfileResult};
use crate::io::PointCloud;
use axis::{compute_dominant_axis, DominantAxis};
use depth_profile::{
    compute_depth_profile, DepthMidpointTable, EmptyBandPolicy, DEFAULT_BAND_HALF_WIDTH,
    DEFAULT_STRIDE,
};
use end_regions::{
    compute_end_region_centroids, validate_percentages, EndRegionCentroids,
    DEFAULT_END_REGION_PERCENTAGES,
};

/// Arithmetic mean of a set of points, `None` when the set is empty.
pub fn centroid<'a, I>(points: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let (sum, n) = points
        .into_iter()
        .fold((Vector3::zeros(), 0usize), |(sum, n), p| (sum + p.coords, n + 1));
    if n == 0 {
        None
    } else {
        Some(Point3::from(sum / n as f64))
    }
}

/// Parameters of a profiling run. Also the `[profile]` table of the pipeline config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    pub stride: u32,
    pub band_half_width: u32,
    pub empty_band: EmptyBandPolicy,
    pub end_region_percentages: Vec<f64>,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            band_half_width: DEFAULT_BAND_HALF_WIDTH,
            empty_band: EmptyBandPolicy::default(),
            end_region_percentages: DEFAULT_END_REGION_PERCENTAGES.to_vec(),
        }
    }
}

impl ProfileOptions {
    pub fn validate(&self) -> ProfileResult<()> {
        if self.stride == 0 {
            return Err(ProfileError::invalid("depth stride must be at least 1"));
        }
        validate_percentages(&self.end_region_percentages)
    }
}

/// Everything the profiler derives from one cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct MidpointProfile {
    pub dominant: DominantAxis,
    pub depths: DepthMidpointTable,
    pub end_regions: Vec<EndRegionCentroids>,
}

/// Finds the elongation axis of a vessel cloud and summarises its cross-sections.
#[derive(Debug, Clone, Default)]
pub struct AxisMidpointProfiler {
    options: ProfileOptions,
}

impl AxisMidpointProfiler {
    pub fn new(options: ProfileOptions) -> ProfileResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ProfileOptions {
        &self.options
    }

    pub fn profile(&self, cloud: &PointCloud) -> ProfileResult<MidpointProfile> {
        let dominant = compute_dominant_axis(cloud)?;
        debug!(
            "The longest axis is: {} (index {}), length {:.2}",
            dominant.axis,
            dominant.axis.index(),
            dominant.length
        );

        let depths = compute_depth_profile(
            cloud,
            dominant.axis,
            self.options.stride,
            self.options.band_half_width,
            self.options.empty_band,
        )?;
        let end_regions = compute_end_region_centroids(
            cloud,
            dominant.axis,
            &self.options.end_region_percentages,
        )?;
        debug!(
            "{} depth midpoints, {} end regions",
            depths.len(),
            end_regions.len()
        );

        Ok(MidpointProfile {
            dominant,
            depths,
            end_regions,
        })
    }
}
