//! Maps items-API payloads into the station, place and visit model.
//!
//! Rows are read field by field from `serde_json::Value`, so one malformed
//! row never fails the whole collection.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{EntityId, Place, Station, VisitRecord};

/// The `{"data": [...]}` envelope every collection endpoint returns.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: Vec<Value>,
}

fn parse_envelope(bytes: &[u8], resource: &str) -> Result<Vec<Value>> {
    let envelope: Envelope = serde_json::from_slice(bytes)
        .with_context(|| format!("malformed {resource} payload"))?;
    Ok(envelope.data)
}

/// Reads a visitor count that may arrive as a number or a numeric string.
///
/// Only whole, non-negative values in `u64` range are accepted.
fn coerce_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(row: &Value, field: &str) -> Option<String> {
    row.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Keeps rows that carry a usable `id`, warning about the rest.
fn rows_with_id(rows: Vec<Value>, resource: &str) -> Vec<(EntityId, Value)> {
    let total = rows.len();

    let kept: Vec<(EntityId, Value)> = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.get("id").and_then(EntityId::from_json)?;
            Some((id, row))
        })
        .collect();

    let dropped = total - kept.len();
    if dropped > 0 {
        warn!(resource, dropped, total, "Rows without a usable id dropped");
    }

    kept
}

/// Decodes the `Stations` collection.
///
/// Missing names become empty strings; unreadable visitor counts become `None`.
/// Rows without a usable id are dropped.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let rows = parse_envelope(bytes, "Stations")?;

    Ok(rows_with_id(rows, "Stations")
        .into_iter()
        .map(|(id, row)| Station {
            id,
            name: text(&row, "Station_Name").unwrap_or_default(),
            visitors_count: row.get("Visitors_Count").and_then(coerce_count),
        })
        .collect())
}

/// Decodes the `Places` collection.
pub fn parse_places(bytes: &[u8]) -> Result<Vec<Place>> {
    let rows = parse_envelope(bytes, "Places")?;

    Ok(rows_with_id(rows, "Places")
        .into_iter()
        .map(|(id, row)| Place {
            id,
            locality_name: text(&row, "Locality_Name").unwrap_or_default(),
        })
        .collect())
}

/// Decodes the `Visitor_Analysis` collection.
///
/// Every object row becomes a record. A non-string `date_created` is kept as
/// missing so window aggregation skips it; station and place references may
/// be plain ids or expanded relation objects. Non-object rows are dropped.
pub fn parse_visits(bytes: &[u8]) -> Result<Vec<VisitRecord>> {
    let rows = parse_envelope(bytes, "Visitor_Analysis")?;
    let total = rows.len();

    let mut untimed = 0;
    let mut unattributed = 0;

    let visits: Vec<VisitRecord> = rows
        .iter()
        .filter(|row| row.is_object())
        .map(|row| {
            let record = VisitRecord {
                created_at: text(row, "date_created"),
                station_id: row.get("station").and_then(EntityId::from_json),
                place_id: row.get("place").and_then(EntityId::from_json),
            };
            if record.created_at.is_none() {
                untimed += 1;
            }
            if record.station_id.is_none() || record.place_id.is_none() {
                unattributed += 1;
            }
            record
        })
        .collect();

    let dropped = total - visits.len();
    if dropped > 0 {
        warn!(dropped, total, "Non-object visit rows dropped");
    }
    if untimed > 0 {
        warn!(untimed, total, "Visit rows without a string date_created");
    }
    if unattributed > 0 {
        warn!(unattributed, total, "Visit rows missing a station or place reference");
    }
    debug!(visits = visits.len(), "Visit rows parsed");

    Ok(visits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stations() {
        let json = br#"{"data": [
            {"id": 1, "Station_Name": "Central", "Visitors_Count": "12"},
            {"id": "2", "Station_Name": "North", "Visitors_Count": 7},
            {"id": 3, "Visitors_Count": null}
        ]}"#;

        let stations = parse_stations(json).unwrap();

        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].name, "Central");
        assert_eq!(stations[0].visitors_count, Some(12));
        assert_eq!(stations[1].id, EntityId::from("2"));
        assert_eq!(stations[1].visitors_count, Some(7));
        assert_eq!(stations[2].name, "");
        assert_eq!(stations[2].visitors_count, None);
    }

    #[test]
    fn test_bad_catalog_rows_do_not_fail_collection() {
        let json = br#"{"data": [
            {"id": 1, "Station_Name": "Central"},
            {"id": null, "Station_Name": "Ghost"},
            {"id": [1, 2], "Station_Name": 42},
            {"id": 4, "Station_Name": {"en": "Airport"}}
        ]}"#;

        let stations = parse_stations(json).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name, "Central");
        assert_eq!(stations[1].id, EntityId::from(4));
        assert_eq!(stations[1].name, "");
    }

    #[test]
    fn test_parse_places() {
        let json = br#"{"data": [{"id": 4, "Locality_Name": "Harbour"}, {"id": 5}, {"Locality_Name": "x"}]}"#;

        let places = parse_places(json).unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].locality_name, "Harbour");
        assert_eq!(places[1].locality_name, "");
    }

    #[test]
    fn test_parse_visits_keeps_rows_with_missing_references() {
        let json = br#"{"data": [
            {"date_created": "2024-01-02T10:00:00.000Z", "station": 1, "place": 4},
            {"date_created": "2024-01-02T11:00:00.000Z", "station": null, "place": 4},
            {"station": 2, "place": "x"}
        ]}"#;

        let visits = parse_visits(json).unwrap();

        assert_eq!(visits.len(), 3);
        assert_eq!(visits[0].station_id, Some(EntityId::from(1)));
        assert_eq!(visits[1].station_id, None);
        assert_eq!(
            visits[1].created_at.as_deref(),
            Some("2024-01-02T11:00:00.000Z")
        );
        assert_eq!(visits[2].created_at, None);
        assert_eq!(visits[2].place_id, Some(EntityId::from("x")));
    }

    #[test]
    fn test_bad_visit_rows_do_not_fail_collection() {
        let json = br#"{"data": [
            {"date_created": "2024-03-13T08:00:00Z", "station": 1, "place": 4},
            {"date_created": 1710316800, "station": {"id": 2, "Station_Name": "North"}, "place": 4},
            {"date_created": {"at": "now"}, "station": [], "place": true},
            "garbage"
        ]}"#;

        let visits = parse_visits(json).unwrap();

        assert_eq!(visits.len(), 3);
        assert_eq!(visits[1].created_at, None);
        assert_eq!(visits[1].station_id, Some(EntityId::from(2)));
        assert_eq!(visits[2].created_at, None);
        assert_eq!(visits[2].station_id, None);
        assert_eq!(visits[2].place_id, None);
    }

    #[test]
    fn test_empty_collection() {
        assert!(parse_places(br#"{"data": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        assert!(parse_stations(br#"[{"id": 1}]"#).is_err());
        assert!(parse_visits(b"not json").is_err());
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(&serde_json::json!(3)), Some(3));
        assert_eq!(coerce_count(&serde_json::json!(3.0)), Some(3));
        assert_eq!(coerce_count(&serde_json::json!(" 9 ")), Some(9));
        assert_eq!(coerce_count(&serde_json::json!("n/a")), None);
        assert_eq!(coerce_count(&serde_json::json!(-1)), None);
    }

    #[test]
    fn test_coerce_count_rejects_fractions_and_overflow() {
        assert_eq!(coerce_count(&serde_json::json!(12.7)), None);
        assert_eq!(coerce_count(&serde_json::json!(1e30)), None);
        assert_eq!(coerce_count(&serde_json::json!("12.7")), None);
    }
}
