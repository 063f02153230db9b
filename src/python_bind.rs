// File: src/python_bind.rs
use nalgebra::Point3;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::BTreeMap;

use crate::error::ProfileError;
use crate::io::input;
use crate::io::output;
use crate::io::PointCloud;
use crate::mesh_to_centerline::{select_seeds_with, SeedStrategy};
use crate::processing::axis::{compute_dominant_axis, Axis};
use crate::processing::depth_profile::{compute_depth_profile, DepthMidpointTable, EmptyBandPolicy};
use crate::processing::end_regions::{
    compute_end_region_centroids, EndRegionCentroids, DEFAULT_END_REGION_PERCENTAGES,
};
use crate::processing::{AxisMidpointProfiler, MidpointProfile, ProfileOptions};

type PyPoint = (f64, f64, f64);

fn value_err(e: ProfileError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn runtime_err(e: anyhow::Error) -> PyErr {
    PyRuntimeError::new_err(format!("{:#}", e))
}

fn to_py_point(p: &Point3<f64>) -> PyPoint {
    (p.x, p.y, p.z)
}

fn policy(fail_on_empty: bool) -> EmptyBandPolicy {
    if fail_on_empty {
        EmptyBandPolicy::Fail
    } else {
        EmptyBandPolicy::Skip
    }
}

fn depths_to_py(table: &DepthMidpointTable) -> BTreeMap<i64, PyPoint> {
    table.iter().map(|(d, p)| (d, to_py_point(p))).collect()
}

fn regions_to_py(regions: &[EndRegionCentroids]) -> Vec<(f64, PyPoint, PyPoint)> {
    regions
        .iter()
        .map(|r| (r.percentage, to_py_point(&r.start), to_py_point(&r.finish)))
        .collect()
}

#[pyclass]
#[derive(Debug, Clone)]
pub struct PyMidpointProfile {
    #[pyo3(get)]
    pub axis: String,
    #[pyo3(get)]
    pub length: f64,
    #[pyo3(get)]
    pub depths: BTreeMap<i64, PyPoint>,
    /// `(percentage, start, finish)` per end region.
    #[pyo3(get)]
    pub end_regions: Vec<(f64, PyPoint, PyPoint)>,
}

#[pymethods]
impl PyMidpointProfile {
    fn __repr__(&self) -> String {
        format!(
            "MidpointProfile(axis={}, length={:.2}, depths={}, end_regions={})",
            self.axis,
            self.length,
            self.depths.len(),
            self.end_regions.len()
        )
    }
}

impl From<&MidpointProfile> for PyMidpointProfile {
    fn from(profile: &MidpointProfile) -> Self {
        Self {
            axis: profile.dominant.axis.name().to_string(),
            length: profile.dominant.length,
            depths: depths_to_py(&profile.depths),
            end_regions: regions_to_py(&profile.end_regions),
        }
    }
}

/// Longest bounding-box axis of a point cloud.
///
/// Returns ``(axis, length)`` with ``axis`` one of ``"X"``, ``"Y"``, ``"Z"``.
///
/// Raises ``ValueError`` for an empty cloud or non-finite coordinates.
#[pyfunction]
pub fn dominant_axis(points: Vec<PyPoint>) -> PyResult<(String, f64)> {
    let cloud = PointCloud::from_tuples(&points);
    let dominant = compute_dominant_axis(&cloud).map_err(value_err)?;
    Ok((dominant.axis.name().to_string(), dominant.length))
}

/// Band centroids at integer depths along ``axis``.
///
/// .. code-block:: python
///
///    import vesselseeds as vs
///    table = vs.depth_profile(points, "z", stride=2, band_half_width=1)
///
#[pyfunction]
#[pyo3(signature = (points, axis, stride = 2u32, band_half_width = 1u32, fail_on_empty = false))]
pub fn depth_profile(
    points: Vec<PyPoint>,
    axis: &str,
    stride: u32,
    band_half_width: u32,
    fail_on_empty: bool,
) -> PyResult<BTreeMap<i64, PyPoint>> {
    let axis: Axis = axis.parse().map_err(value_err)?;
    let cloud = PointCloud::from_tuples(&points);
    let table = compute_depth_profile(
        &cloud,
        axis,
        stride,
        band_half_width,
        policy(fail_on_empty),
    )
    .map_err(value_err)?;
    Ok(depths_to_py(&table))
}

#[pyfunction]
#[pyo3(signature = (points, axis, percentages = None))]
pub fn end_region_centroids(
    points: Vec<PyPoint>,
    axis: &str,
    percentages: Option<Vec<f64>>,
) -> PyResult<Vec<(f64, PyPoint, PyPoint)>> {
    let axis: Axis = axis.parse().map_err(value_err)?;
    let cloud = PointCloud::from_tuples(&points);
    let percentages = percentages.unwrap_or_else(|| DEFAULT_END_REGION_PERCENTAGES.to_vec());
    let regions = compute_end_region_centroids(&cloud, axis, &percentages).map_err(value_err)?;
    Ok(regions_to_py(&regions))
}

/// Dominant axis, depth table and end regions in one call.
#[pyfunction]
#[pyo3(signature = (points, stride = 2u32, band_half_width = 1u32, fail_on_empty = false, percentages = None))]
pub fn profile_points(
    points: Vec<PyPoint>,
    stride: u32,
    band_half_width: u32,
    fail_on_empty: bool,
    percentages: Option<Vec<f64>>,
) -> PyResult<PyMidpointProfile> {
    let mut options = ProfileOptions {
        stride,
        band_half_width,
        empty_band: policy(fail_on_empty),
        ..ProfileOptions::default()
    };
    if let Some(percentages) = percentages {
        options.end_region_percentages = percentages;
    }
    let profiler = AxisMidpointProfiler::new(options).map_err(value_err)?;
    let profile = profiler
        .profile(&PointCloud::from_tuples(&points))
        .map_err(value_err)?;
    Ok(PyMidpointProfile::from(&profile))
}

/// Source and target seeds from a depth table.
///
/// Returns ``((source_depth, source), (target_depth, target))``. With ``step``
/// the target is the last depth reachable from the first in whole steps.
#[pyfunction]
#[pyo3(signature = (depths, step = None))]
pub fn select_seeds(
    depths: BTreeMap<i64, PyPoint>,
    step: Option<u32>,
) -> PyResult<((i64, PyPoint), (i64, PyPoint))> {
    let table: DepthMidpointTable = depths
        .into_iter()
        .map(|(d, (x, y, z))| (d, Point3::new(x, y, z)))
        .collect();
    let strategy = step.map_or(SeedStrategy::Extremes, SeedStrategy::Stepped);
    let seeds = select_seeds_with(&table, strategy).map_err(value_err)?;
    Ok((
        (seeds.source_depth, to_py_point(&seeds.source)),
        (seeds.target_depth, to_py_point(&seeds.target)),
    ))
}

#[pyfunction]
pub fn write_points_txt(path: &str, points: Vec<PyPoint>) -> PyResult<()> {
    let cloud = PointCloud::from_tuples(&points);
    output::write_points_txt(path, cloud.points()).map_err(runtime_err)
}

#[pyfunction]
pub fn read_points_txt(path: &str) -> PyResult<Vec<PyPoint>> {
    let points = input::read_points_txt(path).map_err(runtime_err)?;
    Ok(points.iter().map(to_py_point).collect())
}
