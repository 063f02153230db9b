pub mod input;
pub mod output;

use nalgebra::Point3;
use std::path::Path;

use crate::error::{ProfileError, ProfileResult};

/// Vertex positions sampled from a vessel surface mesh.
///
/// The order of the points carries no meaning and duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    points: Vec<Point3<f64>>,
}

impl PointCloud {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn from_tuples(points: &[(f64, f64, f64)]) -> Self {
        points
            .iter()
            .map(|&(x, y, z)| Point3::new(x, y, z))
            .collect()
    }

    /// Loads the vertices of a mesh file, picking the reader from the extension.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        input::read_point_cloud(path)
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_tuples(&self) -> Vec<(f64, f64, f64)> {
        self.points.iter().map(|p| (p.x, p.y, p.z)).collect()
    }

    /// Rejects clouds the profiler cannot take bounds or centroids of.
    pub fn validate(&self) -> ProfileResult<()> {
        if self.points.is_empty() {
            return Err(ProfileError::invalid("point cloud is empty"));
        }
        if let Some(idx) = self
            .points
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(ProfileError::invalid(format!(
                "point {} has a non-finite coordinate: {:?}",
                idx,
                (self.points[idx].x, self.points[idx].y, self.points[idx].z)
            )));
        }
        Ok(())
    }
}

impl FromIterator<Point3<f64>> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Point3<f64>>> for PointCloud {
    fn from(points: Vec<Point3<f64>>) -> Self {
        Self::new(points)
    }
}
