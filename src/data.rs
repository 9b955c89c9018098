use crate::camera::Extent;
use crate::types::{CountyProperties, Region, RegionId};
use anyhow::{anyhow, Context, Result};
use geo::MultiPolygon;
use geojson::{feature::Id, GeoJson};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const NAME: &str = "shapeName";
const ISO: &str = "shapeISO";
const ID: &str = "shapeID";
const GROUP: &str = "shapeGroup";
const TYPE: &str = "shapeType";

/// Loads the county polygons once at startup. GeoJSON and Shapefile are supported,
/// picked by extension.
pub async fn load_regions(path: &Path) -> Result<Vec<Region>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Geography file has no extension: {:?}", path))?;

    let regions = match extension.as_str() {
        "json" | "geojson" => {
            info!(?path, "loading GeoJSON");
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read GeoJSON file: {:?}", path))?;
            parse_geojson(&content)?
        }
        "shp" => {
            info!(?path, "loading Shapefile");
            let owned: PathBuf = path.to_path_buf();
            tokio::task::spawn_blocking(move || load_shapefile(&owned))
                .await
                .context("Shapefile loader task failed")??
        }
        _ => return Err(anyhow!("Unsupported geometry format: {}", extension)),
    };

    info!(count = regions.len(), "loaded county regions");
    Ok(regions)
}

pub fn parse_geojson(content: &str) -> Result<Vec<Region>> {
    let geojson: GeoJson = content.parse().context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let mut ids = IdAllocator::default();
    let mut regions = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let props = feature
            .properties
            .as_ref()
            .map(|p| CountyProperties {
                shape_name: json_string(p.get(NAME)),
                shape_iso: json_string(p.get(ISO)),
                shape_id: json_string(p.get(ID)),
                shape_group: json_string(p.get(GROUP)),
                shape_type: json_string(p.get(TYPE)),
            })
            .unwrap_or_default();

        let geometry = match feature.geometry {
            Some(geom) => {
                let valid: geo::Geometry<f64> = geom
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geojson geometry: {:?}", e))?;
                match valid {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => {
                        debug!(index, "skipping non-polygon feature");
                        continue;
                    }
                }
            }
            None => continue,
        };

        let feature_id = match feature.id {
            Some(Id::String(s)) => Some(s),
            Some(Id::Number(n)) => Some(n.to_string()),
            None => None,
        };
        let id = ids.allocate(index, props.shape_id.as_deref().or(feature_id.as_deref()));

        if let Some(region) = build_region(id, props, geometry) {
            regions.push(region);
        }
    }

    Ok(regions)
}

fn load_shapefile(path: &Path) -> Result<Vec<Region>> {
    let mut reader = shapefile::Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut ids = IdAllocator::default();
    let mut regions = Vec::new();

    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;

        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            shapefile::Shape::PolygonM(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            _ => continue,
        };

        let field = |name: &str| match record.get(name) {
            Some(shapefile::dbase::FieldValue::Character(Some(s))) => Some(s.trim().to_string()),
            Some(shapefile::dbase::FieldValue::Numeric(Some(n))) => Some(n.to_string()),
            _ => None,
        };
        let props = CountyProperties {
            shape_name: field(NAME),
            shape_iso: field(ISO),
            shape_id: field(ID),
            shape_group: field(GROUP),
            shape_type: field(TYPE),
        };

        let id = ids.allocate(index, props.shape_id.as_deref());
        if let Some(region) = build_region(id, props, geometry) {
            regions.push(region);
        }
    }

    Ok(regions)
}

fn build_region(
    id: RegionId,
    properties: CountyProperties,
    geometry: MultiPolygon<f64>,
) -> Option<Region> {
    let Some(extent) = Extent::of(&geometry) else {
        warn!(%id, "skipping county with empty geometry");
        return None;
    };
    Some(Region {
        id,
        properties,
        geometry,
        extent,
    })
}

fn json_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Hands out unique region ids, preferring the source id.
#[derive(Default)]
struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    fn allocate(&mut self, index: usize, preferred: Option<&str>) -> RegionId {
        let base = match preferred {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => format!("region-{index}"),
        };
        let mut id = base.clone();
        let mut suffix = index;
        while self.taken.contains(&id) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.taken.insert(id.clone());
        RegionId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"shapeName": "Nairobi", "shapeISO": "KE-30", "shapeID": "KEN-ADM1-30", "shapeGroup": "KEN", "shapeType": "ADM1"},
                "geometry": {"type": "Polygon", "coordinates": [[[36.6, -1.45], [37.1, -1.45], [37.1, -1.15], [36.6, -1.15], [36.6, -1.45]]]}
            },
            {
                "type": "Feature",
                "properties": {"shapeName": "Mombasa", "shapeID": 28},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[39.5, -4.1], [39.8, -4.1], [39.8, -3.9], [39.5, -3.9], [39.5, -4.1]]]]}
            },
            {
                "type": "Feature",
                "properties": {"shapeName": "Marker"},
                "geometry": {"type": "Point", "coordinates": [37.0, 0.0]}
            }
        ]
    }"#;

    #[test]
    fn parses_polygons_and_skips_points() {
        let regions = parse_geojson(TWO_COUNTIES).expect("parse");
        assert_eq!(regions.len(), 2);

        let nairobi = &regions[0];
        assert_eq!(nairobi.id.as_str(), "KEN-ADM1-30");
        assert_eq!(nairobi.name(), "Nairobi");
        assert_eq!(nairobi.properties.shape_type.as_deref(), Some("ADM1"));
        assert!((nairobi.extent.west - 36.6).abs() < 1e-9);

        let mombasa = &regions[1];
        assert_eq!(mombasa.id.as_str(), "28");
        assert_eq!(mombasa.properties.shape_iso, None);
    }

    #[test]
    fn ids_fall_back_and_stay_unique() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"shapeID": "dup"}, "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type": "Feature", "properties": {"shapeID": "dup"}, "geometry": {"type": "Polygon", "coordinates": [[[2,0],[3,0],[3,1],[2,0]]]}},
                {"type": "Feature", "properties": null, "geometry": {"type": "Polygon", "coordinates": [[[4,0],[5,0],[5,1],[4,0]]]}}
            ]
        }"#;
        let regions = parse_geojson(content).expect("parse");
        let ids: Vec<&str> = regions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["dup", "dup-1", "region-2"]);
        assert_eq!(regions[2].properties, CountyProperties::default());
    }

    #[test]
    fn suffixed_ids_skip_ids_already_in_the_file() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"shapeID": "a-2", "shapeName": "First"}, "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type": "Feature", "properties": {"shapeID": "a"}, "geometry": {"type": "Polygon", "coordinates": [[[2,0],[3,0],[3,1],[2,0]]]}},
                {"type": "Feature", "properties": {"shapeID": "a", "shapeName": "Third"}, "geometry": {"type": "Polygon", "coordinates": [[[4,0],[5,0],[5,1],[4,0]]]}}
            ]
        }"#;
        let regions = parse_geojson(content).expect("parse");
        let ids: Vec<&str> = regions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a-2", "a", "a-3"]);

        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), regions.len());
        assert_eq!(regions[0].name(), "First");
        assert_eq!(regions[2].name(), "Third");
    }

    #[test]
    fn rejects_bare_geometry() {
        let err = parse_geojson(r#"{"type": "Point", "coordinates": [0, 0]}"#).unwrap_err();
        assert!(err.to_string().contains("FeatureCollection"));
        assert!(parse_geojson("not json").is_err());
    }

    #[tokio::test]
    async fn loads_from_disk_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("counties.geojson");
        std::fs::write(&path, TWO_COUNTIES).expect("write");
        let regions = load_regions(&path).await.expect("load");
        assert_eq!(regions.len(), 2);

        assert!(load_regions(&dir.path().join("missing.geojson")).await.is_err());
        assert!(load_regions(&dir.path().join("counties.kml")).await.is_err());
        assert!(load_regions(&dir.path().join("no_extension")).await.is_err());
    }
}
