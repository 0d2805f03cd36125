//! Shape classification.
//!
//! Partitions the raw records of a document into the eight category buckets
//! by substring-matching each record's type discriminator against the fixed
//! category markers. Classification is pure and order-preserving; records
//! that cannot be placed are skipped and reported, never fatal.

use crate::document::{MapDocument, RawRecordEntry, RawShapeRecord};
use crate::models::{Shape, ShapeCategory, ShapeSet};

/// Why a record was left out of every bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The record failed to decode; carries the decode error text.
    MalformedRecord(String),
    /// No `$type` at the record root or under `MapElement`.
    MissingDiscriminator,
    /// A discriminator that matches none of the known markers.
    UnknownDiscriminator(String),
}

/// A record dropped during classification, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Index into the document's `MapShapes` array.
    pub index: usize,
    pub reason: SkipReason,
}

/// The result of classifying one document.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub shapes: ShapeSet,
    pub skipped: Vec<SkippedRecord>,
}

impl Classification {
    /// Bucketed shapes plus skipped records; always equals the input length.
    pub fn total(&self) -> usize {
        self.shapes.len() + self.skipped.len()
    }
}

/// Match a discriminator against the category markers, first match wins.
pub fn match_category(discriminator: &str) -> Option<ShapeCategory> {
    ShapeCategory::ALL.into_iter().find(|c| discriminator.contains(c.marker()))
}

/// Classify every record of a document into a [`ShapeSet`].
pub fn classify(document: &MapDocument) -> Classification {
    let mut result = Classification::default();

    for (index, entry) in document.map_shapes.iter().enumerate() {
        let record = match entry {
            RawRecordEntry::Record(record) => record,
            RawRecordEntry::Malformed(reason) => {
                result.skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::MalformedRecord(reason.clone()),
                });
                continue;
            }
        };

        match record.discriminator() {
            None => {
                tracing::warn!("Shape at index {} is missing a '$type' field, skipping", index);
                result
                    .skipped
                    .push(SkippedRecord { index, reason: SkipReason::MissingDiscriminator });
            }
            Some(discriminator) => match match_category(discriminator) {
                Some(category) => result.shapes.push(normalize(record, category)),
                None => {
                    tracing::warn!(
                        "Unknown shape type '{}' at index {}, skipping",
                        discriminator,
                        index
                    );
                    result.skipped.push(SkippedRecord {
                        index,
                        reason: SkipReason::UnknownDiscriminator(discriminator.to_string()),
                    });
                }
            },
        }
    }

    result
}

/// Resolve a raw record's fallback chains into one normalized shape.
///
/// A record with no geometry after the fallback chain still lands in its
/// bucket; the render planner is what skips drawing it.
fn normalize(record: &RawShapeRecord, category: ShapeCategory) -> Shape {
    Shape {
        category,
        name: record.resolve_name(),
        points: record.resolve_points(),
        speed_limit_mps: record.resolve_speed_limit(),
        utc_time: record.resolve_utc_time(),
        second_edge_start: record.resolve_second_edge(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MapDocument;

    fn doc(json: &str) -> MapDocument {
        MapDocument::from_json_str(json).unwrap()
    }

    #[test]
    fn test_classifies_into_matching_buckets() {
        let document = doc(r#"{"MapShapes": [
            {"$type": "Planner.AozShapeDto, Planner", "Name": "pit"},
            {"$type": "Planner.RoadShapeDto, Planner", "Name": "haul"},
            {"MapElement": {"$type": "EdgeDumpShapeDto", "Name": "edge"}},
            {"$type": "DrivableShapeDto_V1"}
        ]}"#);

        let result = classify(&document);
        assert_eq!(result.shapes.get(ShapeCategory::Aoz).len(), 1);
        assert_eq!(result.shapes.get(ShapeCategory::Road).len(), 1);
        assert_eq!(result.shapes.get(ShapeCategory::Dump).len(), 1);
        assert_eq!(result.shapes.get(ShapeCategory::Drivable).len(), 1);
        assert!(result.skipped.is_empty());
        assert_eq!(result.shapes.get(ShapeCategory::Dump)[0].name, "edge");
    }

    #[test]
    fn test_skips_missing_and_unknown_discriminators() {
        let document = doc(r#"{"MapShapes": [
            {"Name": "no type at all"},
            {"$type": "SomethingElseDto"},
            {"$type": "StationShapeDto"}
        ]}"#);

        let result = classify(&document);
        assert_eq!(result.shapes.len(), 1);
        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.skipped[0].reason, SkipReason::MissingDiscriminator);
        assert_eq!(
            result.skipped[1].reason,
            SkipReason::UnknownDiscriminator("SomethingElseDto".to_string())
        );
    }

    #[test]
    fn test_malformed_record_skipped_with_reason() {
        let document = doc(r#"{"MapShapes": [
            {"$type": "RoadShapeDto", "SpeedLimit": "fast", "Name": "bad"},
            {"$type": "RoadShapeDto", "Name": "good"}
        ]}"#);

        let result = classify(&document);
        assert_eq!(result.shapes.get(ShapeCategory::Road).len(), 1);
        assert_eq!(result.shapes.get(ShapeCategory::Road)[0].name, "good");
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].index, 0);
        assert!(matches!(result.skipped[0].reason, SkipReason::MalformedRecord(_)));
        assert_eq!(result.total(), document.len());
    }

    #[test]
    fn test_count_round_trip() {
        let document = doc(r#"{"MapShapes": [
            {"$type": "RoadShapeDto"},
            {"$type": "Mystery"},
            {},
            {"$type": "LoadShapeDto"},
            {"$type": "ReferenceShapeDto"}
        ]}"#);

        let result = classify(&document);
        assert_eq!(result.total(), document.len());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let document = doc(r#"{"MapShapes": [
            {"$type": "RoadShapeDto", "Name": "a"},
            {"$type": "RoadShapeDto", "Name": "b"},
            {"$type": "ObstacleShapeDto", "Name": "c"}
        ]}"#);

        let first = classify(&document);
        let second = classify(&document);
        assert_eq!(first.shapes, second.shapes);
        assert_eq!(first.skipped, second.skipped);
    }

    #[test]
    fn test_source_order_preserved_within_category() {
        let document = doc(r#"{"MapShapes": [
            {"$type": "RoadShapeDto", "Name": "north"},
            {"$type": "AozShapeDto", "Name": "pit"},
            {"$type": "RoadShapeDto", "Name": "south"}
        ]}"#);

        let result = classify(&document);
        let names: Vec<_> =
            result.shapes.get(ShapeCategory::Road).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["north", "south"]);
    }

    #[test]
    fn test_empty_geometry_still_classified() {
        let document = doc(r#"{"MapShapes": [{"$type": "ReferenceShapeDto", "Name": "r"}]}"#);
        let result = classify(&document);

        let reference = &result.shapes.get(ShapeCategory::Reference)[0];
        assert!(reference.points.is_empty());
    }

    #[test]
    fn test_versioned_discriminator_matches_by_substring() {
        assert_eq!(
            match_category("MineModel.Dto.RoadShapeDto_V3, MineModel"),
            Some(ShapeCategory::Road)
        );
        assert_eq!(match_category(""), None);
    }
}
