use nalgebra::Point3;
use std::f64::consts::PI;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::io::PointCloud;
use crate::processing::axis::Axis;

/// Generates a regular grid filling a box with the given extents.
pub fn generate_box_points(
    extents: (f64, f64, f64),
    origin: (f64, f64, f64),
    samples_per_axis: usize,
) -> PointCloud {
    let n = samples_per_axis.max(2);
    let step = |extent: f64, i: usize| extent * i as f64 / (n - 1) as f64;
    let mut points = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                points.push(Point3::new(
                    origin.0 + step(extents.0, i),
                    origin.1 + step(extents.1, j),
                    origin.2 + step(extents.2, k),
                ));
            }
        }
    }
    PointCloud::new(points)
}

/// Generates rings of a cylinder surface along Z, starting at z = 0.
pub fn generate_cylinder_points(
    radius: f64,
    length: f64,
    ring_spacing: f64,
    points_per_ring: usize,
) -> PointCloud {
    let n_rings = (length / ring_spacing).round() as usize;
    let mut points = Vec::with_capacity((n_rings + 1) * points_per_ring);
    for ring in 0..=n_rings {
        let z = ring as f64 * ring_spacing;
        for i in 0..points_per_ring {
            let theta = 2.0 * PI * (i as f64) / (points_per_ring as f64);
            points.push(Point3::new(radius * theta.cos(), radius * theta.sin(), z));
        }
    }
    PointCloud::new(points)
}

/// Generates evenly spaced points along one axis, leaving out every open
/// interval listed in `gaps`.
pub fn generate_line_points(
    axis: Axis,
    start: f64,
    end: f64,
    step: f64,
    gaps: &[(f64, f64)],
) -> PointCloud {
    let n = ((end - start) / step).round() as usize;
    (0..=n)
        .map(|i| start + i as f64 * step)
        .filter(|v| !gaps.iter().any(|&(lo, hi)| *v > lo && *v < hi))
        .map(|v| {
            let mut p = Point3::<f64>::origin();
            p[axis.index()] = v;
            p
        })
        .collect()
}

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A fresh directory under the system temp dir.
pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "vesselseeds_{}_{}_{}_{}",
        prefix,
        std::process::id(),
        nanos,
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
