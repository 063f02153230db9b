//! Depth profiles and centerline seed points for vessel surface meshes.
//!
//! A vessel mesh is read as a point cloud, its longest bounding-box axis is
//! taken as the depth direction, and the cloud is summarised by band centroids
//! at integer depths plus centroids of its two end regions. The first and last
//! depth centroids seed an external centerline solver.
//!
//! ```no_run
//! use vesselseeds::{AxisMidpointProfiler, PointCloud, select_seeds};
//!
//! let cloud = PointCloud::load("case_01/aorta.obj")?;
//! let profile = AxisMidpointProfiler::default().profile(&cloud)?;
//! let seeds = select_seeds(&profile.depths)?;
//! println!("{:?} -> {:?}", seeds.source, seeds.target);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod entry;
mod error;
pub mod io;
pub mod mesh_to_centerline;
pub mod processing;
mod utils;

#[cfg(feature = "python")]
mod python_bind;

pub use error::{Band, ProfileError, ProfileResult, RegionEnd};
pub use io::PointCloud;
pub use mesh_to_centerline::{select_seeds, SeedPair, SeedStrategy};
pub use processing::axis::{Axis, DominantAxis};
pub use processing::depth_profile::{DepthMidpointTable, EmptyBandPolicy};
pub use processing::end_regions::EndRegionCentroids;
pub use processing::{AxisMidpointProfiler, MidpointProfile, ProfileOptions};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// This is the module importable from Python:
///
/// ```python
/// import vesselseeds as vs
/// profile = vs.profile_points(points)
/// (src_depth, src), (dst_depth, dst) = vs.select_seeds(profile.depths)
/// ```
#[cfg(feature = "python")]
#[pymodule]
fn vesselseeds(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(python_bind::dominant_axis, m)?)?;
    m.add_function(wrap_pyfunction!(python_bind::depth_profile, m)?)?;
    m.add_function(wrap_pyfunction!(python_bind::end_region_centroids, m)?)?;
    m.add_function(wrap_pyfunction!(python_bind::profile_points, m)?)?;
    m.add_function(wrap_pyfunction!(python_bind::select_seeds, m)?)?;
    m.add_function(wrap_pyfunction!(python_bind::write_points_txt, m)?)?;
    m.add_function(wrap_pyfunction!(python_bind::read_points_txt, m)?)?;

    m.add_class::<python_bind::PyMidpointProfile>()?;
    Ok(())
}
