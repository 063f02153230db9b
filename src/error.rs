//! Error types for the midpoint profiler.

use std::fmt;
use thiserror::Error;

/// Result type alias for profiler operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Which end of the dominant axis an end region is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionEnd {
    Start,
    Finish,
}

impl fmt::Display for RegionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionEnd::Start => write!(f, "start"),
            RegionEnd::Finish => write!(f, "finish"),
        }
    }
}

/// A slice of the cloud that turned out to contain no points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    /// Cross-sectional band centred on an integer depth.
    Depth(i64),
    /// End region at a fraction of the axis extent.
    EndRegion { percentage: f64, end: RegionEnd },
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Depth(depth) => write!(f, "depth band {}", depth),
            Band::EndRegion { percentage, end } => {
                write!(f, "{} end region at {:.0}%", end, percentage * 100.0)
            }
        }
    }
}

/// Errors that can occur while profiling a point cloud.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    /// Empty or malformed cloud, or an out-of-range parameter.
    #[error("invalid input: {details}")]
    InvalidInput { details: String },

    /// A band has no points, so its centroid is undefined.
    #[error("{band} contains no points")]
    EmptyBand { band: Band },

    /// The caller asked for something the profile cannot provide.
    #[error("precondition failed: {details}")]
    Precondition { details: String },
}

impl ProfileError {
    pub(crate) fn invalid(details: impl Into<String>) -> Self {
        ProfileError::InvalidInput {
            details: details.into(),
        }
    }
}
