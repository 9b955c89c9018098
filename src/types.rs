use crate::camera::Extent;
use geo::MultiPolygon;
use serde::Serialize;
use std::fmt;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegionId(pub String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attribute set of a county feature, exactly as found in the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountyProperties {
    pub shape_name: Option<String>,
    pub shape_iso: Option<String>,
    pub shape_id: Option<String>,
    pub shape_group: Option<String>,
    pub shape_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub properties: CountyProperties,
    pub geometry: MultiPolygon<f64>,
    pub extent: Extent,
}

impl Region {
    pub fn name(&self) -> &str {
        self.properties.shape_name.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Payload of a "region selected" event. Every field is filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyData {
    pub shape_name: String,
    #[serde(rename = "shapeISO")]
    pub shape_iso: String,
    #[serde(rename = "shapeID")]
    pub shape_id: String,
    pub shape_group: String,
    pub shape_type: String,
}

impl From<&CountyProperties> for CountyData {
    fn from(props: &CountyProperties) -> Self {
        let or_unknown = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string()
        };
        Self {
            shape_name: or_unknown(&props.shape_name),
            shape_iso: or_unknown(&props.shape_iso),
            shape_id: or_unknown(&props.shape_id),
            shape_group: or_unknown(&props.shape_group),
            shape_type: or_unknown(&props.shape_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attributes_become_unknown() {
        let props = CountyProperties {
            shape_name: Some("Kisumu".into()),
            shape_iso: Some("KE-17".into()),
            shape_type: None,
            shape_group: Some(String::new()),
            ..Default::default()
        };
        let data = CountyData::from(&props);
        assert_eq!(data.shape_name, "Kisumu");
        assert_eq!(data.shape_iso, "KE-17");
        assert_eq!(data.shape_type, UNKNOWN);
        assert_eq!(data.shape_group, UNKNOWN);
        assert_eq!(data.shape_id, UNKNOWN);
    }

    #[test]
    fn county_data_serializes_with_source_field_names() {
        let data = CountyData::from(&CountyProperties {
            shape_name: Some("Lamu".into()),
            ..Default::default()
        });
        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["shapeName"], "Lamu");
        assert_eq!(json["shapeISO"], UNKNOWN);
        assert_eq!(json["shapeID"], UNKNOWN);
    }
}
