//! CRS identifier to projection definition lookup.
//!
//! Only the CRSs used by the common tile matrix sets are known by code.
//! Anything else can still be used by passing a raw PROJ string
//! (`+proj=...`) as the identifier.

use crate::error::{ProjectionError, ProjectionResult};

/// Identifier of geographic WGS84 in degrees (longitude, latitude).
pub const WGS84: &str = "EPSG:4326";

const LONGLAT_WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";
const LONGLAT_ETRS89: &str = "+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs";
const WEB_MERCATOR: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 \
    +units=m +nadgrids=@null +wktext +no_defs";
const WORLD_MERCATOR: &str = "+proj=merc +lon_0=0 +k=1 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs";
const ETRS89_LAEA: &str =
    "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +ellps=GRS80 \
    +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";
const UPS_NORTH: &str =
    "+proj=stere +lat_0=90 +lat_ts=90 +lon_0=0 +k=0.994 +x_0=2000000 +y_0=2000000 +datum=WGS84 +units=m +no_defs";
const UPS_SOUTH: &str =
    "+proj=stere +lat_0=-90 +lat_ts=-90 +lon_0=0 +k=0.994 +x_0=2000000 +y_0=2000000 +datum=WGS84 +units=m +no_defs";

/// A resolved projection definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsDefinition {
    /// PROJ string understood by `proj4rs`.
    pub proj: String,
    /// Whether coordinates are angular (degrees at the API boundary).
    pub geographic: bool,
}

impl CrsDefinition {
    fn projected(proj: impl Into<String>) -> Self {
        Self {
            proj: proj.into(),
            geographic: false,
        }
    }

    fn geographic(proj: impl Into<String>) -> Self {
        Self {
            proj: proj.into(),
            geographic: true,
        }
    }
}

/// Resolve a CRS identifier into a projection definition.
///
/// Accepts `EPSG:<code>` (case-insensitive), the OGC CRS84 identifiers and
/// raw PROJ strings.
pub fn lookup(crs: &str) -> ProjectionResult<CrsDefinition> {
    let trimmed = crs.trim();

    if trimmed.starts_with("+proj=") {
        let geographic = trimmed.contains("+proj=longlat") || trimmed.contains("+proj=latlong");
        return Ok(CrsDefinition {
            proj: trimmed.to_string(),
            geographic,
        });
    }

    let upper = trimmed.to_uppercase();
    match upper.as_str() {
        "OGC:CRS84" | "CRS:84" | "HTTP://WWW.OPENGIS.NET/DEF/CRS/OGC/1.3/CRS84" => {
            return Ok(CrsDefinition::geographic(LONGLAT_WGS84))
        }
        _ => {}
    }

    let code = upper
        .strip_prefix("EPSG:")
        .and_then(|c| c.parse::<u32>().ok())
        .ok_or_else(|| ProjectionError::UnsupportedCrs(crs.to_string()))?;

    epsg_definition(code).ok_or_else(|| ProjectionError::UnsupportedCrs(crs.to_string()))
}

fn epsg_definition(code: u32) -> Option<CrsDefinition> {
    let def = match code {
        4326 => CrsDefinition::geographic(LONGLAT_WGS84),
        4258 => CrsDefinition::geographic(LONGLAT_ETRS89),
        3857 | 900913 => CrsDefinition::projected(WEB_MERCATOR),
        3395 => CrsDefinition::projected(WORLD_MERCATOR),
        3035 => CrsDefinition::projected(ETRS89_LAEA),
        5041 => CrsDefinition::projected(UPS_NORTH),
        5042 => CrsDefinition::projected(UPS_SOUTH),
        32601..=32660 => CrsDefinition::projected(format!(
            "+proj=utm +zone={} +datum=WGS84 +units=m +no_defs",
            code - 32600
        )),
        32701..=32760 => CrsDefinition::projected(format!(
            "+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs",
            code - 32700
        )),
        _ => return None,
    };
    Some(def)
}
