use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use log::debug;
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::PointCloud;
use crate::mesh_to_centerline::SeedPair;
use crate::processing::depth_profile::DepthMidpointTable;

/// File formats a point cloud can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// Wavefront OBJ, only `v` lines are read.
    Obj,
    /// ASCII or binary STL.
    Stl,
    /// Plain text, one `x y z` triple per line.
    Text,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "obj" => Some(MeshFormat::Obj),
                "stl" => Some(MeshFormat::Stl),
                "txt" | "xyz" => Some(MeshFormat::Text),
                _ => None,
            })
    }
}

/// Reads the vertices of a mesh file as a point cloud.
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| {
        anyhow!(
            "unsupported point cloud format {:?}: {}",
            path.extension().and_then(|e| e.to_str()).unwrap_or(""),
            path.display()
        )
    })?;

    let points = match format {
        MeshFormat::Obj => read_obj_vertices(path)?,
        MeshFormat::Stl => read_stl_vertices(path)?,
        MeshFormat::Text => read_points_txt(path)?,
    };
    if points.is_empty() {
        bail!("no vertices found in {}", path.display());
    }
    debug!("Read {} points from {:?} ({:?})", points.len(), path, format);
    Ok(PointCloud::new(points))
}

pub fn read_obj_vertices<P: AsRef<Path>>(path: P) -> Result<Vec<Point3<f64>>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open OBJ file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut vertices = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        // "vt" and "vn" lines share the prefix, so match on the first token.
        let mut parts = trimmed.split_whitespace();
        if parts.next() != Some("v") {
            continue;
        }
        let coords = parts
            .take(3)
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("{}:{}: bad vertex line", path.display(), line_no + 1))?;
        if coords.len() != 3 {
            bail!(
                "{}:{}: vertex needs three coordinates, got {}",
                path.display(),
                line_no + 1,
                coords.len()
            );
        }
        vertices.push(Point3::new(coords[0], coords[1], coords[2]));
    }
    Ok(vertices)
}

pub fn read_stl_vertices<P: AsRef<Path>>(path: P) -> Result<Vec<Point3<f64>>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open STL file {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let stl = stl_io::read_stl(&mut reader)
        .with_context(|| format!("failed to parse STL file {}", path.display()))?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );
    Ok(stl
        .vertices
        .iter()
        .map(|v| Point3::new(v.0[0] as f64, v.0[1] as f64, v.0[2] as f64))
        .collect())
}

/// Reads the plain-text point format written by `output::write_points_txt`.
pub fn read_points_txt<P: AsRef<Path>>(path: P) -> Result<Vec<Point3<f64>>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open point file {}", path.display()))?;

    let mut points = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("{}: bad row {}", path.display(), i + 1))?;
        let (x, y, z): (f64, f64, f64) = record
            .deserialize(None)
            .with_context(|| format!("{}: row {} is not an x y z triple", path.display(), i + 1))?;
        points.push(Point3::new(x, y, z));
    }
    Ok(points)
}

/// Reads depth-midpoint metadata written by `output::write_depth_table`.
pub fn read_depth_table<P: AsRef<Path>>(path: P) -> Result<DepthMidpointTable> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open depth metadata {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse depth metadata {}", path.display()))
}

pub fn read_seed_pair<P: AsRef<Path>>(path: P) -> Result<SeedPair> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open seed file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse seed file {}", path.display()))
}
