//! Boundary loader: reads the static district-boundary GeoJSON
//! (planar EPSG:5179 coordinates, converted once from the upstream
//! TopoJSON) into district polygons.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use geojson::{Feature, GeoJson, Value};
use tracing::warn;

use crate::map::District;

/// Property keys that may carry the district name, checked in order.
const NAME_KEYS: &[&str] = &["nm", "name", "SIG_KOR_NM"];

/// Load district polygons from a GeoJSON file. Loaded once at startup;
/// a missing or malformed file is fatal.
pub fn load_districts(path: &Path) -> Result<Vec<District>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading boundary file {}", path.display()))?;
    parse_districts(&content)
        .with_context(|| format!("parsing boundary file {}", path.display()))
}

/// Parse a GeoJSON FeatureCollection of district polygons.
pub fn parse_districts(content: &str) -> Result<Vec<District>> {
    let geojson: GeoJson = content.parse().context("invalid GeoJSON")?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        bail!("boundary file must be a FeatureCollection");
    };

    let mut districts = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(name) = feature_name(&feature) else {
            warn!("skipping boundary feature without a district name");
            continue;
        };

        let rings = feature_rings(&feature);
        if rings.is_empty() {
            warn!(district = %name, "skipping district without polygon geometry");
            continue;
        }

        districts.push(District::new(name, rings));
    }

    if districts.is_empty() {
        bail!("boundary file contained no usable district polygons");
    }
    Ok(districts)
}

fn feature_name(feature: &Feature) -> Option<String> {
    let props = feature.properties.as_ref()?;
    NAME_KEYS
        .iter()
        .find_map(|key| props.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Exterior rings of the feature's polygon(s). Interior rings are
/// ignored; Seoul's districts have none.
fn feature_rings(feature: &Feature) -> Vec<Vec<(f64, f64)>> {
    let Some(geometry) = &feature.geometry else {
        return Vec::new();
    };

    let ring_coords = |ring: &[Vec<f64>]| -> Vec<(f64, f64)> {
        ring.iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    };

    match &geometry.value {
        Value::Polygon(rings) => rings.first().map(|r| vec![ring_coords(r)]).unwrap_or_default(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| rings.first().map(|r| ring_coords(r)))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"nm": "중구"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[953000, 1952000], [955000, 1952000], [955000, 1954000], [953000, 1954000], [953000, 1952000]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"SIG_KOR_NM": "강서구"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[940000, 1950000], [942000, 1950000], [942000, 1952000], [940000, 1950000]]],
                        [[[938000, 1949000], [939000, 1949000], [939000, 1949500], [938000, 1949000]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_districts() {
        let districts = parse_districts(SAMPLE).unwrap();
        assert_eq!(districts.len(), 2);

        assert_eq!(districts[0].name, "중구");
        assert_eq!(districts[0].rings.len(), 1);
        assert!(districts[0].contains(954000.0, 1953000.0));

        // MultiPolygon keeps both parts, fallback name key works
        assert_eq!(districts[1].name, "강서구");
        assert_eq!(districts[1].rings.len(), 2);
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = parse_districts(r#"{"type": "Point", "coordinates": [0, 0]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_empty_collection() {
        let err = parse_districts(r#"{"type": "FeatureCollection", "features": []}"#);
        assert!(err.is_err());
    }
}
