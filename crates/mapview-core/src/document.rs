//! Raw map document parsing and field normalization.
//!
//! Exports from older planning-tool versions moved geometry and attributes
//! between three locations: the record root, a nested `MapElement`, and a
//! nested `Polygon`. Each attribute is resolved here through its ordered
//! fallback chain exactly once, so downstream code only ever sees the
//! normalized [`Shape`](crate::models::Shape) record.
//!
//! Records decode independently: a wrong-typed field poisons only its own
//! record, which is kept as a [`RawRecordEntry::Malformed`] placeholder so
//! classification can report it without losing the rest of the document.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;

use crate::error::{MapviewError, Result};
use crate::models::shape::UNNAMED;
use crate::models::Point;

/// A parsed map document, prior to classification.
#[derive(Debug, Clone)]
pub struct MapDocument {
    /// One entry per element of the source `MapShapes` array, in order.
    pub map_shapes: Vec<RawRecordEntry>,
}

/// One element of the `MapShapes` array.
#[derive(Debug, Clone)]
pub enum RawRecordEntry {
    Record(RawShapeRecord),
    /// The element failed to decode; carries the decode error text.
    Malformed(String),
}

impl RawRecordEntry {
    pub fn as_record(&self) -> Option<&RawShapeRecord> {
        match self {
            RawRecordEntry::Record(record) => Some(record),
            RawRecordEntry::Malformed(_) => None,
        }
    }
}

impl MapDocument {
    /// Parse a document from JSON text.
    ///
    /// A document without a `MapShapes` list is rejected with
    /// [`MapviewError::InvalidDocument`]; callers surface that as an advisory
    /// status and continue with an empty shape set. Individual records that
    /// fail to decode do not fail the document; they are kept as
    /// [`RawRecordEntry::Malformed`] at their source index.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let shapes = match value.get("MapShapes") {
            None => {
                return Err(MapviewError::InvalidDocument {
                    reason: "'MapShapes' is missing".to_string(),
                })
            }
            Some(shapes) => shapes,
        };
        let items = match shapes.as_array() {
            None => {
                return Err(MapviewError::InvalidDocument {
                    reason: "'MapShapes' is not an array".to_string(),
                })
            }
            Some(items) => items,
        };

        let map_shapes = items
            .iter()
            .enumerate()
            .map(|(index, item)| match serde_json::from_value(item.clone()) {
                Ok(record) => RawRecordEntry::Record(record),
                Err(e) => {
                    tracing::warn!("Record at index {} could not be decoded: {}", index, e);
                    RawRecordEntry::Malformed(e.to_string())
                }
            })
            .collect();

        Ok(Self { map_shapes })
    }

    /// Parse a document from a reader (the file-upload boundary).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.map_shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map_shapes.is_empty()
    }
}

/// One raw record from the `MapShapes` array, all legacy locations intact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShapeRecord {
    #[serde(rename = "$type")]
    pub type_tag: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Points")]
    pub points: Option<Vec<Point>>,
    #[serde(rename = "SpeedLimit")]
    pub speed_limit: Option<f64>,
    #[serde(rename = "UtcTime")]
    pub utc_time: Option<String>,
    #[serde(rename = "SecondEdgeStartsAtIndex")]
    pub second_edge_starts_at_index: Option<usize>,
    #[serde(rename = "MapElement")]
    pub map_element: Option<RawMapElement>,
    #[serde(rename = "Polygon")]
    pub polygon: Option<RawPolygon>,
}

/// The nested `MapElement` wrapper some export versions use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMapElement {
    #[serde(rename = "$type")]
    pub type_tag: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Points")]
    pub points: Option<Vec<Point>>,
    #[serde(rename = "SpeedLimit")]
    pub speed_limit: Option<f64>,
    #[serde(rename = "UtcTime")]
    pub utc_time: Option<String>,
    #[serde(rename = "SecondEdgeStartsAtIndex")]
    pub second_edge_starts_at_index: Option<usize>,
}

/// The nested `Polygon` wrapper, the oldest geometry location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPolygon {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Points")]
    pub points: Option<Vec<Point>>,
}

impl RawShapeRecord {
    /// The type discriminator: record root first, then `MapElement`.
    pub fn discriminator(&self) -> Option<&str> {
        self.type_tag
            .as_deref()
            .or_else(|| self.map_element.as_ref().and_then(|e| e.type_tag.as_deref()))
    }

    /// Geometry: `Points`, then `MapElement.Points`, then `Polygon.Points`.
    pub fn resolve_points(&self) -> Vec<Point> {
        self.points
            .clone()
            .or_else(|| self.map_element.as_ref().and_then(|e| e.points.clone()))
            .or_else(|| self.polygon.as_ref().and_then(|p| p.points.clone()))
            .unwrap_or_default()
    }

    /// Name: `Name`, then `MapElement.Name`, then `Polygon.Name`, else "Unnamed".
    pub fn resolve_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.map_element.as_ref().and_then(|e| e.name.clone()))
            .or_else(|| self.polygon.as_ref().and_then(|p| p.name.clone()))
            .unwrap_or_else(|| UNNAMED.to_string())
    }

    /// Speed limit in m/s: `SpeedLimit`, then `MapElement.SpeedLimit`.
    ///
    /// No default is substituted here; display-time defaulting is the render
    /// planner's concern.
    pub fn resolve_speed_limit(&self) -> Option<f64> {
        self.speed_limit.or_else(|| self.map_element.as_ref().and_then(|e| e.speed_limit))
    }

    /// Timestamp: `UtcTime`, then `MapElement.UtcTime`.
    ///
    /// An unparsable timestamp is dropped with a warning, it never fails the
    /// record.
    pub fn resolve_utc_time(&self) -> Option<DateTime<Utc>> {
        let raw = self
            .utc_time
            .as_deref()
            .or_else(|| self.map_element.as_ref().and_then(|e| e.utc_time.as_deref()))?;

        match raw.parse::<DateTime<Utc>>() {
            Ok(time) => Some(time),
            Err(e) => {
                tracing::warn!("Unparsable UtcTime '{}': {}", raw, e);
                None
            }
        }
    }

    /// Dual-edge split index: record root first, then `MapElement`.
    pub fn resolve_second_edge(&self) -> Option<usize> {
        self.second_edge_starts_at_index
            .or_else(|| self.map_element.as_ref().and_then(|e| e.second_edge_starts_at_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_map_shapes_rejected() {
        let err = MapDocument::from_json_str(r#"{"Other": []}"#).unwrap_err();
        assert!(matches!(err, MapviewError::InvalidDocument { .. }));
    }

    #[test]
    fn test_map_shapes_not_a_list_rejected() {
        let err = MapDocument::from_json_str(r#"{"MapShapes": 42}"#).unwrap_err();
        assert!(matches!(err, MapviewError::InvalidDocument { .. }));
    }

    #[test]
    fn test_unparsable_json_is_json_error() {
        let err = MapDocument::from_json_str("not json").unwrap_err();
        assert!(matches!(err, MapviewError::Json(_)));
    }

    #[test]
    fn test_empty_map_shapes_is_valid() {
        let doc = MapDocument::from_json_str(r#"{"MapShapes": []}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_points_fallback_chain_prefers_first_present() {
        let doc = MapDocument::from_json_str(
            r#"{"MapShapes": [{
                "$type": "RoadShapeDto",
                "Points": [{"X": 1.0, "Y": 1.0}],
                "MapElement": {"Points": [{"X": 2.0, "Y": 2.0}]},
                "Polygon": {"Points": [{"X": 3.0, "Y": 3.0}]}
            }]}"#,
        )
        .unwrap();

        let points = doc.map_shapes[0].as_record().unwrap().resolve_points();
        assert_eq!(points, vec![Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_points_fall_back_to_polygon() {
        let doc = MapDocument::from_json_str(
            r#"{"MapShapes": [{
                "$type": "AozShapeDto",
                "Polygon": {"Points": [{"X": 3.0, "Y": 3.0}], "Name": "pit"}
            }]}"#,
        )
        .unwrap();

        let record = doc.map_shapes[0].as_record().unwrap();
        assert_eq!(record.resolve_points(), vec![Point::new(3.0, 3.0)]);
        assert_eq!(record.resolve_name(), "pit");
    }

    #[test]
    fn test_name_defaults_to_unnamed() {
        let record = RawShapeRecord::default();
        assert_eq!(record.resolve_name(), "Unnamed");
    }

    #[test]
    fn test_discriminator_falls_back_to_map_element() {
        let doc = MapDocument::from_json_str(
            r#"{"MapShapes": [{"MapElement": {"$type": "Namespaced.RoadShapeDto_V2"}}]}"#,
        )
        .unwrap();
        let record = doc.map_shapes[0].as_record().unwrap();
        assert_eq!(record.discriminator(), Some("Namespaced.RoadShapeDto_V2"));
    }

    #[test]
    fn test_wrong_typed_field_poisons_only_its_record() {
        let doc = MapDocument::from_json_str(
            r#"{"MapShapes": [
                {"$type": "RoadShapeDto", "SpeedLimit": "fast"},
                {"$type": "AozShapeDto", "Name": "pit"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(doc.len(), 2);
        assert!(matches!(doc.map_shapes[0], RawRecordEntry::Malformed(_)));
        let record = doc.map_shapes[1].as_record().unwrap();
        assert_eq!(record.resolve_name(), "pit");
    }

    #[test]
    fn test_bad_utc_time_resolves_to_none() {
        let record = RawShapeRecord {
            utc_time: Some("not a timestamp".to_string()),
            ..Default::default()
        };
        assert!(record.resolve_utc_time().is_none());
    }

    #[test]
    fn test_utc_time_parses_rfc3339() {
        let record = RawShapeRecord {
            utc_time: Some("2025-06-01T12:00:00Z".to_string()),
            ..Default::default()
        };
        let time = record.resolve_utc_time().unwrap();
        assert_eq!(time.timestamp(), 1_748_779_200);
    }
}
