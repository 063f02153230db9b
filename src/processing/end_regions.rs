use nalgebra::Point3;

use super::axis::{Axis, Bounds};
use super::centroid;
use crate::error::{Band, ProfileError, ProfileResult, RegionEnd};
use crate::io::PointCloud;

pub const DEFAULT_END_REGION_PERCENTAGES: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

/// Centroids of the points near both ends of the dominant axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndRegionCentroids {
    pub percentage: f64,
    pub start: Point3<f64>,
    pub finish: Point3<f64>,
}

pub(crate) fn validate_percentages(percentages: &[f64]) -> ProfileResult<()> {
    match percentages
        .iter()
        .find(|p| !(p.is_finite() && **p > 0.0 && **p <= 1.0))
    {
        Some(p) => Err(ProfileError::invalid(format!(
            "end region percentage {} is outside (0, 1]",
            p
        ))),
        None => Ok(()),
    }
}

/// For every percentage `p`, averages the points within `p * length` of the
/// minimum end and within `p * length` of the maximum end of `axis`.
///
/// Each percentage gets its own pair of bands; the finishing band is never
/// borrowed from a different percentage.
pub fn compute_end_region_centroids(
    cloud: &PointCloud,
    axis: Axis,
    percentages: &[f64],
) -> ProfileResult<Vec<EndRegionCentroids>> {
    validate_percentages(percentages)?;
    let bounds = Bounds::of(cloud)?;
    let idx = axis.index();
    let length = bounds.extent_along(axis);
    let (lo, hi) = (bounds.min_along(axis), bounds.max_along(axis));

    percentages
        .iter()
        .map(|&percentage| {
            let region_depth = length * percentage;
            let start_upper = lo + region_depth;
            let finish_lower = hi - region_depth;

            let start = centroid(cloud.points().iter().filter(|p| p[idx] <= start_upper))
                .ok_or(ProfileError::EmptyBand {
                    band: Band::EndRegion {
                        percentage,
                        end: RegionEnd::Start,
                    },
                })?;
            let finish = centroid(cloud.points().iter().filter(|p| p[idx] >= finish_lower))
                .ok_or(ProfileError::EmptyBand {
                    band: Band::EndRegion {
                        percentage,
                        end: RegionEnd::Finish,
                    },
                })?;
            Ok(EndRegionCentroids {
                percentage,
                start,
                finish,
            })
        })
        .collect()
}

#[cfg(test)]
mod end_region_tests {
    use super::*;
    use crate::utils::test_utils::{generate_cylinder_points, generate_line_points};
    use approx::assert_relative_eq;

    #[test]
    fn test_line_end_regions() {
        // x = 0, 1, ..., 10
        let cloud = generate_line_points(Axis::X, 0.0, 10.0, 1.0, &[]);
        let regions = compute_end_region_centroids(&cloud, Axis::X, &[0.1, 0.5]).unwrap();
        assert_eq!(regions.len(), 2);

        // 10%: {0, 1} and {9, 10}
        assert_relative_eq!(regions[0].start.x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(regions[0].finish.x, 9.5, epsilon = 1e-9);
        // 50%: {0..=5} and {5..=10}
        assert_relative_eq!(regions[1].start.x, 2.5, epsilon = 1e-9);
        assert_relative_eq!(regions[1].finish.x, 7.5, epsilon = 1e-9);
    }

    #[test]
    fn test_finish_band_matches_its_own_percentage() {
        let cloud = generate_line_points(Axis::Z, 0.0, 20.0, 1.0, &[]);
        let percentages = DEFAULT_END_REGION_PERCENTAGES;
        let regions = compute_end_region_centroids(&cloud, Axis::Z, &percentages).unwrap();
        assert_eq!(regions.len(), percentages.len());
        for region in &regions {
            // Symmetric cloud: both bands mirror each other around z = 10.
            assert_relative_eq!(region.start.z + region.finish.z, 20.0, epsilon = 1e-9);
        }
        assert!(regions[0].finish.z > regions[8].finish.z);
    }

    #[test]
    fn test_full_percentage_covers_whole_cloud() {
        let cloud = generate_cylinder_points(1.0, 10.0, 0.5, 12);
        let regions = compute_end_region_centroids(&cloud, Axis::Z, &[1.0]).unwrap();
        assert_relative_eq!(regions[0].start.z, 5.0, epsilon = 1e-9);
        assert_relative_eq!(regions[0].finish.z, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_percentage_out_of_range() {
        let cloud = generate_line_points(Axis::X, 0.0, 4.0, 1.0, &[]);
        for bad in [0.0, -0.2, 1.5, f64::NAN] {
            let result = compute_end_region_centroids(&cloud, Axis::X, &[0.1, bad]);
            assert!(
                matches!(result, Err(ProfileError::InvalidInput { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_no_percentages_gives_no_regions() {
        let cloud = generate_line_points(Axis::X, 0.0, 4.0, 1.0, &[]);
        let regions = compute_end_region_centroids(&cloud, Axis::X, &[]).unwrap();
        assert!(regions.is_empty());
    }
}
