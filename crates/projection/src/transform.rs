//! Point transforms between two fixed CRSs.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::debug;

use crate::definitions::lookup;
use crate::error::{ProjectionError, ProjectionResult};

/// Transforms coordinates from a source CRS to a target CRS.
///
/// Geographic CRSs take and return degrees; the radian conversion needed by
/// the engine happens inside [`Transformer::transform`].
pub struct Transformer {
    source: Proj,
    target: Proj,
    source_crs: String,
    target_crs: String,
    source_is_geographic: bool,
    target_is_geographic: bool,
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("source_crs", &self.source_crs)
            .field("target_crs", &self.target_crs)
            .field("source_is_geographic", &self.source_is_geographic)
            .field("target_is_geographic", &self.target_is_geographic)
            .finish_non_exhaustive()
    }
}

impl Transformer {
    /// Create a transformer between two CRS identifiers.
    pub fn new(source_crs: &str, target_crs: &str) -> ProjectionResult<Self> {
        let source_def = lookup(source_crs)?;
        let target_def = lookup(target_crs)?;

        let source = Proj::from_proj_string(&source_def.proj).map_err(|e| {
            ProjectionError::InvalidDefinition {
                crs: source_crs.to_string(),
                message: format!("{e:?}"),
            }
        })?;
        let target = Proj::from_proj_string(&target_def.proj).map_err(|e| {
            ProjectionError::InvalidDefinition {
                crs: target_crs.to_string(),
                message: format!("{e:?}"),
            }
        })?;

        debug!(source = source_crs, target = target_crs, "created transformer");

        Ok(Self {
            source,
            target,
            source_crs: source_crs.to_string(),
            target_crs: target_crs.to_string(),
            source_is_geographic: source_def.geographic,
            target_is_geographic: target_def.geographic,
        })
    }

    pub fn source_crs(&self) -> &str {
        &self.source_crs
    }

    pub fn target_crs(&self) -> &str {
        &self.target_crs
    }

    /// Transform a single coordinate.
    pub fn transform(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        let (in_x, in_y) = if self.source_is_geographic {
            (x.to_radians(), y.to_radians())
        } else {
            (x, y)
        };

        let mut point = (in_x, in_y, 0.0);
        transform(&self.source, &self.target, &mut point)
            .map_err(|e| self.failure(x, y, format!("{e:?}")))?;

        let (out_x, out_y) = if self.target_is_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if !out_x.is_finite() || !out_y.is_finite() {
            return Err(self.failure(x, y, "non-finite result".to_string()));
        }

        Ok((out_x, out_y))
    }

    fn failure(&self, x: f64, y: f64, message: String) -> ProjectionError {
        ProjectionError::TransformFailed {
            source_crs: self.source_crs.clone(),
            target_crs: self.target_crs.clone(),
            x,
            y,
            message,
        }
    }
}
