use anyhow::Context;
use log::debug;
use nalgebra::Point3;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::mesh_to_centerline::SeedPair;
use crate::processing::depth_profile::DepthMidpointTable;

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create output directory: {:?}", parent))?;
    }
    Ok(())
}

/// Writes one `x y z` line per point, every coordinate with three decimals.
pub fn write_points_txt<P: AsRef<Path>>(path: P, points: &[Point3<f64>]) -> anyhow::Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    for p in points {
        writeln!(writer, "{:.3} {:.3} {:.3}", p.x, p.y, p.z)?;
    }
    writer.flush()?;
    debug!("Wrote {} points to {:?}", points.len(), path);
    Ok(())
}

fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> anyhow::Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to serialise {:?}", path))?;
    writer.flush()?;
    Ok(())
}

/// Persists a depth table as a JSON object of depth -> `[x, y, z]`.
pub fn write_depth_table<P: AsRef<Path>>(path: P, table: &DepthMidpointTable) -> anyhow::Result<()> {
    write_json(path, table)
}

pub fn write_seed_pair<P: AsRef<Path>>(path: P, seeds: &SeedPair) -> anyhow::Result<()> {
    write_json(path, seeds)
}
