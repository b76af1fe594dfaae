use geo::MultiPolygon;
use serde::Deserialize;

/// One row of the education dataset. Field names follow the upstream JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EducationRecord {
    pub fips: u32,
    pub area_name: String,
    pub state: String,
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// A county boundary decoded from the topology payload. Coordinates are
/// pre-projected planar values, drawn without any further projection.
#[derive(Debug, Clone)]
pub struct CountyShape {
    pub fips: u32,
    pub geometry: MultiPolygon<f64>,
}

/// Everything decoded from the geometry dataset: per-county shapes plus the
/// state outlines derived from the same topology.
#[derive(Debug, Clone)]
pub struct MapShapes {
    pub counties: Vec<CountyShape>,
    pub state_borders: Vec<MultiPolygon<f64>>,
}
