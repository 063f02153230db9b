use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProfileError, ProfileResult};
use crate::io::PointCloud;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Enumeration order, which is also the tie-break order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" | "0" => Ok(Axis::X),
            "y" | "1" => Ok(Axis::Y),
            "z" | "2" => Ok(Axis::Z),
            _ => Err(ProfileError::invalid(format!("unknown axis {:?}", s))),
        }
    }
}

/// Axis-aligned bounding box of a cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds {
    /// Fails on an empty or non-finite cloud.
    pub fn of(cloud: &PointCloud) -> ProfileResult<Bounds> {
        cloud.validate()?;
        let first = cloud.points()[0];
        let (min, max) = cloud
            .points()
            .iter()
            .skip(1)
            .fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
        Ok(Bounds { min, max })
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn min_along(&self, axis: Axis) -> f64 {
        self.min[axis.index()]
    }

    pub fn max_along(&self, axis: Axis) -> f64 {
        self.max[axis.index()]
    }

    pub fn extent_along(&self, axis: Axis) -> f64 {
        self.max_along(axis) - self.min_along(axis)
    }
}

/// The axis a cloud is most elongated along, with its extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantAxis {
    pub axis: Axis,
    pub length: f64,
    pub bounds: Bounds,
}

/// Picks the axis with the largest bounding-box extent.
///
/// Equal extents resolve to the earliest axis in X, Y, Z order.
pub fn compute_dominant_axis(cloud: &PointCloud) -> ProfileResult<DominantAxis> {
    let bounds = Bounds::of(cloud)?;
    let mut best = Axis::X;
    for axis in Axis::ALL.into_iter().skip(1) {
        if bounds.extent_along(axis) > bounds.extent_along(best) {
            best = axis;
        }
    }
    Ok(DominantAxis {
        axis: best,
        length: bounds.extent_along(best),
        bounds,
    })
}
