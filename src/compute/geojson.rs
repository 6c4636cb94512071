//! GeoJSON loading boundary for polygon records.
//!
//! A `FeatureCollection` is turned into [`PolygonRecord`]s: `Polygon`
//! features give one record, `MultiPolygon` features one record per part,
//! all parts sharing a single property map. Only string-valued properties
//! survive. Other geometry types are skipped.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use polylocate_types::geo::{Polygon, Properties, polygon_from_rings};

use crate::error::{LocateError, Result};
use crate::index::PolygonRecord;

/// Records converted from a feature collection.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<PolygonRecord>,
    /// Polygon features dropped because their coordinates were malformed.
    pub skipped: usize,
}

/// Parses a GeoJSON document. A bare `Feature` is wrapped in a collection.
pub fn parse_str(geojson: &str) -> Result<FeatureCollection> {
    let parsed: GeoJson = serde_json::from_str(geojson)
        .map_err(|e| LocateError::InvalidFormat(format!("Failed to parse GeoJSON: {}", e)))?;
    into_collection(parsed)
}

/// Reads and parses a GeoJSON document.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<FeatureCollection> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_str(&buf)
}

/// Reads and parses a GeoJSON file.
pub fn parse_path<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_reader(std::io::BufReader::new(file))
}

fn into_collection(geojson: GeoJson) -> Result<FeatureCollection> {
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(LocateError::InvalidFormat(
            "expected a FeatureCollection or Feature, got a bare Geometry".to_string(),
        )),
    }
}

/// Converts every polygonal feature of `collection` into records.
///
/// When `index_key` is set, each feature's properties gain that key holding
/// the feature's 1-based position in the collection (counting every feature,
/// polygonal or not). A feature with malformed coordinates is skipped and
/// counted when `skip_invalid` is true, and is an error otherwise.
pub fn collection_records(
    collection: &FeatureCollection,
    index_key: Option<&str>,
    skip_invalid: bool,
) -> Result<LoadedRecords> {
    let mut loaded = LoadedRecords::default();

    for (idx, feature) in collection.features.iter().enumerate() {
        let position = idx + 1;
        match feature_records(feature, position, index_key) {
            Ok(records) => loaded.records.extend(records),
            Err(e) if skip_invalid => {
                log::warn!("skipping feature {}: {}", position, e);
                loaded.skipped += 1;
            }
            Err(e) => {
                return Err(LocateError::InvalidGeometry(format!(
                    "feature {}: {}",
                    position, e
                )));
            }
        }
    }

    log::debug!(
        "converted {} features into {} polygon records ({} skipped)",
        collection.features.len(),
        loaded.records.len(),
        loaded.skipped
    );
    Ok(loaded)
}

/// Converts one feature. Non-polygonal features give no records.
pub fn feature_records(
    feature: &Feature,
    position: usize,
    index_key: Option<&str>,
) -> Result<Vec<PolygonRecord>> {
    let Some(geometry) = &feature.geometry else {
        log::debug!("feature {} has no geometry", position);
        return Ok(Vec::new());
    };

    let polygons = match &geometry.value {
        Value::Polygon(rings) => vec![polygon_from_positions(rings)?],
        Value::MultiPolygon(parts) => parts
            .iter()
            .map(|rings| polygon_from_positions(rings))
            .collect::<Result<Vec<_>>>()?,
        other => {
            log::debug!(
                "feature {} skipped: {} is not polygonal",
                position,
                geometry_type(other)
            );
            return Ok(Vec::new());
        }
    };

    let mut properties = feature_properties(feature);
    if let Some(key) = index_key {
        properties.insert(key.to_string(), position.to_string());
    }
    let properties = Arc::new(properties);

    Ok(polygons
        .into_iter()
        .map(|polygon| PolygonRecord::new(polygon, Arc::clone(&properties)))
        .collect())
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// String-valued properties of a feature; other JSON values are dropped.
pub fn feature_properties(feature: &Feature) -> Properties {
    feature
        .properties
        .iter()
        .flatten()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}

fn polygon_from_positions(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>> {
    let rings = rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|coords| {
                    if coords.len() < 2 {
                        return Err(LocateError::InvalidGeometry(
                            "Coordinate must have at least 2 values".to_string(),
                        ));
                    }
                    Ok((coords[0], coords[1]))
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(polygon_from_rings(rings))
}

/// Converts a Polygon to a GeoJSON geometry.
pub fn polygon_to_geometry(polygon: &Polygon<f64>) -> Geometry {
    let rings = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
        .collect();
    Geometry::new(Value::Polygon(rings))
}

/// Converts a Polygon to GeoJSON.
pub fn polygon_to_geojson(polygon: &Polygon<f64>) -> Result<String> {
    serde_json::to_string(&polygon_to_geometry(polygon)).map_err(|e| {
        LocateError::SerializationErrorWithContext(format!("Failed to serialize polygon: {}", e))
    })
}

/// Parses a GeoJSON `Polygon` geometry.
pub fn polygon_from_geojson(geojson: &str) -> Result<Polygon<f64>> {
    let geom: Geometry = serde_json::from_str(geojson)
        .map_err(|e| LocateError::InvalidInput(format!("Failed to parse GeoJSON: {}", e)))?;

    match geom.value {
        Value::Polygon(rings) => {
            if rings.is_empty() {
                return Err(LocateError::InvalidInput(
                    "Polygon must have at least one ring".to_string(),
                ));
            }
            polygon_from_positions(&rings)
        }
        _ => Err(LocateError::InvalidInput(
            "GeoJSON geometry is not a Polygon".to_string(),
        )),
    }
}

/// Converts a property map to a JSON object of string values.
pub fn properties_to_json(properties: &Properties) -> JsonObject {
    properties
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect()
}

/// Builds a feature from a polygon and its properties.
pub fn polygon_feature(polygon: &Polygon<f64>, properties: &Properties) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(polygon_to_geometry(polygon)),
        id: None,
        properties: Some(properties_to_json(properties)),
        foreign_members: None,
    }
}
