//! Conversion between geographic coordinates and a grid CRS.

use geo::{
    Coord, Geometry, GeometryCollection, Line, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use projection::{Transformer, WGS84};
use tracing::debug;

use crate::error::{TmsError, TmsResult};

/// Converts between a source CRS (usually geographic degrees) and a
/// projected grid CRS.
pub trait Projector {
    /// Source CRS to target CRS.
    fn forward(&self, x: f64, y: f64) -> TmsResult<(f64, f64)>;

    /// Target CRS back to source CRS.
    fn inverse(&self, x: f64, y: f64) -> TmsResult<(f64, f64)>;
}

/// Projector backed by the `projection` crate.
#[derive(Debug)]
pub struct ProjProjector {
    forward: Transformer,
    inverse: Transformer,
}

impl ProjProjector {
    pub fn new(source_crs: &str, target_crs: &str) -> TmsResult<Self> {
        let forward = Transformer::new(source_crs, target_crs)
            .map_err(|e| TmsError::projection("create forward transform", e))?;
        let inverse = Transformer::new(target_crs, source_crs)
            .map_err(|e| TmsError::projection("create inverse transform", e))?;

        debug!(source = source_crs, target = target_crs, "created projector");

        Ok(Self { forward, inverse })
    }

    /// Projector from WGS84 longitude/latitude in degrees.
    pub fn from_wgs84(target_crs: &str) -> TmsResult<Self> {
        Self::new(WGS84, target_crs)
    }

    pub fn source_crs(&self) -> &str {
        self.forward.source_crs()
    }

    pub fn target_crs(&self) -> &str {
        self.forward.target_crs()
    }
}

impl Projector for ProjProjector {
    fn forward(&self, x: f64, y: f64) -> TmsResult<(f64, f64)> {
        self.forward
            .transform(x, y)
            .map_err(|e| TmsError::projection("forward transform", e))
    }

    fn inverse(&self, x: f64, y: f64) -> TmsResult<(f64, f64)> {
        self.inverse
            .transform(x, y)
            .map_err(|e| TmsError::projection("inverse transform", e))
    }
}

/// Reproject every coordinate of a geometry.
///
/// Returns a copy of the input when both CRS identifiers are equal. The
/// first failing coordinate aborts the whole operation.
pub fn project_geometry(
    geometry: &Geometry<f64>,
    source_crs: &str,
    target_crs: &str,
) -> TmsResult<Geometry<f64>> {
    if source_crs == target_crs {
        return Ok(geometry.clone());
    }

    let transformer = Transformer::new(source_crs, target_crs)
        .map_err(|e| TmsError::projection("project geometry", e))?;
    GeometryProjector {
        transformer: &transformer,
    }
    .geometry(geometry)
}

struct GeometryProjector<'a> {
    transformer: &'a Transformer,
}

impl GeometryProjector<'_> {
    fn geometry(&self, geometry: &Geometry<f64>) -> TmsResult<Geometry<f64>> {
        let projected = match geometry {
            Geometry::Point(p) => Geometry::Point(self.point(p)?),
            Geometry::Line(l) => {
                Geometry::Line(Line::new(self.coord(l.start)?, self.coord(l.end)?))
            }
            Geometry::LineString(ls) => Geometry::LineString(self.line_string(ls)?),
            Geometry::Polygon(p) => Geometry::Polygon(self.polygon(p)?),
            Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint::new(
                mp.iter().map(|p| self.point(p)).collect::<TmsResult<_>>()?,
            )),
            Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString::new(
                mls.iter()
                    .map(|ls| self.line_string(ls))
                    .collect::<TmsResult<_>>()?,
            )),
            Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon::new(
                mp.iter().map(|p| self.polygon(p)).collect::<TmsResult<_>>()?,
            )),
            Geometry::GeometryCollection(gc) => {
                Geometry::GeometryCollection(GeometryCollection::new_from(
                    gc.iter()
                        .map(|g| self.geometry(g))
                        .collect::<TmsResult<_>>()?,
                ))
            }
            Geometry::Rect(_) => return Err(TmsError::UnsupportedGeometry("Rect".to_string())),
            Geometry::Triangle(_) => {
                return Err(TmsError::UnsupportedGeometry("Triangle".to_string()))
            }
        };
        Ok(projected)
    }

    fn coord(&self, c: Coord<f64>) -> TmsResult<Coord<f64>> {
        let (x, y) = self
            .transformer
            .transform(c.x, c.y)
            .map_err(|e| TmsError::projection("project geometry", e))?;
        Ok(Coord { x, y })
    }

    fn point(&self, p: &Point<f64>) -> TmsResult<Point<f64>> {
        Ok(Point::from(self.coord(p.0)?))
    }

    fn line_string(&self, ls: &LineString<f64>) -> TmsResult<LineString<f64>> {
        Ok(LineString::new(
            ls.coords().map(|c| self.coord(*c)).collect::<TmsResult<_>>()?,
        ))
    }

    fn polygon(&self, p: &Polygon<f64>) -> TmsResult<Polygon<f64>> {
        let exterior = self.line_string(p.exterior())?;
        let interiors = p
            .interiors()
            .iter()
            .map(|ring| self.line_string(ring))
            .collect::<TmsResult<_>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}
