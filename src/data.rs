use crate::config::InputConfig;
use crate::error::{ChartError, Result};
use crate::types::{CountyShape, EducationRecord, MapShapes};
use geo::MultiPolygon;
use geojson::Feature;
use topojson::{to_geojson, TopoJson, Topology};
use tracing::info;

/// Fetches both datasets concurrently and decodes them. Either failure aborts
/// before any rendering; a single attempt per resource, no retries.
pub async fn load_datasets(input: &InputConfig) -> Result<(Vec<EducationRecord>, MapShapes)> {
    let client = reqwest::Client::new();
    let (edu_body, topo_body) = tokio::try_join!(
        fetch_text(&client, &input.education_url),
        fetch_text(&client, &input.counties_url)
    )?;

    let records: Vec<EducationRecord> =
        serde_json::from_str(&edu_body).map_err(|e| ChartError::Parse {
            what: "education dataset",
            message: e.to_string(),
        })?;
    info!(records = records.len(), "loaded education dataset");

    let shapes = decode_topology(&topo_body, &input.counties_object, &input.states_object)?;
    info!(
        counties = shapes.counties.len(),
        state_borders = shapes.state_borders.len(),
        "decoded topology payload"
    );

    Ok((records, shapes))
}

async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let fetch_err = |source| ChartError::Fetch {
        url: url.to_string(),
        source,
    };
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?;
    response.text().await.map_err(fetch_err)
}

/// Decodes the topology payload into county shapes and state outlines. Both
/// object collections come from the same encoded source; shared borders are
/// stored once as arcs and stitched back together here.
pub fn decode_topology(
    body: &str,
    counties_object: &str,
    states_object: &str,
) -> Result<MapShapes> {
    let topology = parse_topology(body)?;

    let counties = to_geojson(&topology, counties_object)
        .map_err(topo_err)?
        .features
        .into_iter()
        .map(feature_to_county)
        .collect::<Result<Vec<_>>>()?;

    let state_borders = to_geojson(&topology, states_object)
        .map_err(topo_err)?
        .features
        .into_iter()
        .filter_map(|f| feature_to_multipolygon(f).transpose())
        .collect::<Result<Vec<_>>>()?;

    Ok(MapShapes {
        counties,
        state_borders,
    })
}

fn parse_topology(body: &str) -> Result<Topology> {
    match body.parse::<TopoJson>().map_err(topo_err)? {
        TopoJson::Topology(t) => Ok(t),
        _ => Err(ChartError::Parse {
            what: "topology payload",
            message: "expected a Topology document".to_string(),
        }),
    }
}

fn topo_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Parse {
        what: "topology payload",
        message: e.to_string(),
    }
}

fn feature_to_county(feature: Feature) -> Result<CountyShape> {
    let fips = feature_id(&feature).ok_or_else(|| ChartError::Parse {
        what: "county feature",
        message: "county feature has no numeric id".to_string(),
    })?;
    let geometry = feature_to_multipolygon(feature)?.ok_or_else(|| ChartError::Parse {
        what: "county feature",
        message: format!("county {} has no polygonal geometry", fips),
    })?;
    Ok(CountyShape { fips, geometry })
}

fn feature_id(feature: &Feature) -> Option<u32> {
    match &feature.id {
        Some(geojson::feature::Id::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(geojson::feature::Id::String(s)) => s.parse().ok(),
        None => None,
    }
}

fn feature_to_multipolygon(feature: Feature) -> Result<Option<MultiPolygon<f64>>> {
    let geometry = match feature.geometry {
        Some(g) => g,
        None => return Ok(None),
    };
    let geo_geometry: geo::Geometry<f64> =
        geometry.value.try_into().map_err(|e: geojson::Error| ChartError::Parse {
            what: "topology geometry",
            message: e.to_string(),
        })?;
    Ok(match geo_geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        // Points and lines carry no area to fill or outline.
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    const SQUARE_TOPOLOGY: &str = r#"{
        "type": "Topology",
        "objects": {
            "counties": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": 1, "arcs": [[0]]}
                ]
            },
            "states": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0]]}
                ]
            }
        },
        "arcs": [
            [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]
        ]
    }"#;

    #[test]
    fn decodes_counties_and_states_from_one_payload() {
        let shapes = decode_topology(SQUARE_TOPOLOGY, "counties", "states").unwrap();
        assert_eq!(shapes.counties.len(), 1);
        assert_eq!(shapes.counties[0].fips, 1);
        assert_eq!(shapes.counties[0].geometry.unsigned_area(), 100.0);
        assert_eq!(shapes.state_borders.len(), 1);
    }

    #[test]
    fn missing_object_collection_is_a_parse_error() {
        let err = decode_topology(SQUARE_TOPOLOGY, "nope", "states").unwrap_err();
        assert!(matches!(err, ChartError::Parse { .. }));
    }

    #[test]
    fn non_topology_document_is_rejected() {
        let err = decode_topology(r#"{"type": "FeatureCollection", "features": []}"#, "c", "s")
            .unwrap_err();
        assert!(matches!(err, ChartError::Parse { .. }));
    }
}
