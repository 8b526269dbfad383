//! Observation record types.
//!
//! This module defines the journal entry persisted by the observation log and
//! its exact JSON shape:
//!
//! ```json
//! {
//!   "id": "1718035200000",
//!   "timestamp": "2024-06-10T16:00:00.000Z",
//!   "description": "Bird sighting",
//!   "imageUri": null,
//!   "location": { "latitude": 55.6761, "longitude": 12.5683 }
//! }
//! ```

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Shown in place of an empty description.
pub const NO_DESCRIPTION: &str = "(no description)";

/// Last creation instant handed out, in Unix milliseconds.
static LAST_CREATED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude, -90 to 90.
    pub latitude: f64,
    /// Longitude, -180 to 180.
    pub longitude: f64,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat {:.4}, Lon {:.4}", self.latitude, self.longitude)
    }
}

/// One user-authored journal entry.
///
/// Records are immutable once created. The id and timestamp are assigned
/// together from the same creation instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    /// Unique identifier: creation time in Unix milliseconds.
    pub id: String,

    /// When the record was created.
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,

    /// Free-text note, trimmed at creation. May be empty.
    pub description: String,

    /// Opaque reference to a locally captured photo.
    #[serde(default)]
    pub image_uri: Option<String>,

    /// Where the observation was made.
    #[serde(default)]
    pub location: Option<Location>,
}

impl ObservationRecord {
    /// Create a record stamped with the current time.
    ///
    /// Ids are strictly increasing within a process, even when two records are
    /// created in the same millisecond.
    #[must_use]
    pub fn new(description: &str, image_uri: Option<String>, location: Option<Location>) -> Self {
        let millis = next_creation_millis(Utc::now().timestamp_millis());
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_else(Utc::now);

        Self {
            id: millis.to_string(),
            timestamp,
            description: description.trim().to_string(),
            image_uri,
            location,
        }
    }

    /// Check whether the record carries a description, a photo or a location.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.description.is_empty() || self.image_uri.is_some() || self.location.is_some()
    }

    /// One-line summary for the observation list.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} ({})", self.display_description(), self.local_time())
    }

    /// Multi-line rendering of every field for the details view.
    #[must_use]
    pub fn details(&self) -> String {
        let description = self.display_description();
        let photo = self.image_uri.as_deref().unwrap_or("none");
        let location = self
            .location
            .map_or_else(|| "none".to_string(), |location| location.to_string());

        format!(
            "Id:          {}\nTime:        {}\nDescription: {description}\nPhoto:       {photo}\nLocation:    {location}\n",
            self.id,
            self.local_time(),
        )
    }

    fn display_description(&self) -> &str {
        if self.description.is_empty() {
            NO_DESCRIPTION
        } else {
            &self.description
        }
    }

    fn local_time(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// Reserve the next creation instant, never repeating one already issued.
fn next_creation_millis(now: i64) -> i64 {
    let mut last = LAST_CREATED_MILLIS.load(Ordering::SeqCst);
    loop {
        let next = now.max(last + 1);
        match LAST_CREATED_MILLIS.compare_exchange_weak(
            last,
            next,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_description() {
        let record = ObservationRecord::new("  Bird sighting \n", None, None);
        assert_eq!(record.description, "Bird sighting");
    }

    #[test]
    fn test_new_id_matches_timestamp() {
        let record = ObservationRecord::new("x", None, None);
        assert_eq!(record.id, record.timestamp.timestamp_millis().to_string());
    }

    #[test]
    fn test_ids_strictly_increase() {
        let ids: Vec<i64> = (0..50)
            .map(|_| ObservationRecord::new("x", None, None).id.parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_next_creation_millis_never_goes_backwards() {
        let first = next_creation_millis(i64::from(i32::MAX));
        let second = next_creation_millis(0);
        assert!(second > first);
    }

    #[test]
    fn test_has_content() {
        assert!(!ObservationRecord::new("   ", None, None).has_content());
        assert!(ObservationRecord::new("note", None, None).has_content());
        assert!(ObservationRecord::new("", Some("file://x.jpg".into()), None).has_content());
        assert!(ObservationRecord::new("", None, Some(Location::new(1.0, 2.0))).has_content());
    }

    #[test]
    fn test_serialized_shape() {
        let record = ObservationRecord::new("Bird sighting", None, None);
        let value = serde_json::to_value(&record).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 5);
        assert!(object["id"].is_string());
        assert!(object["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(object["description"], "Bird sighting");
        assert!(object["imageUri"].is_null());
        assert!(object["location"].is_null());
    }

    #[test]
    fn test_timestamp_has_millisecond_precision() {
        let json = r#"{"id":"1","timestamp":"2024-06-10T16:00:00.123Z","description":""}"#;
        let record: ObservationRecord = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["timestamp"], "2024-06-10T16:00:00.123Z");
    }

    #[test]
    fn test_round_trip_with_and_without_optionals() {
        let bare = ObservationRecord::new("only text", None, None);
        let full = ObservationRecord::new(
            "",
            Some("file://x.jpg".to_string()),
            Some(Location::new(55.6761, 12.5683)),
        );

        for record in [bare, full] {
            let json = serde_json::to_string(&record).unwrap();
            let parsed: ObservationRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, record);
        }
    }

    #[test]
    fn test_parses_full_position_object() {
        let json = r#"{
            "id": "1718035200000",
            "timestamp": "2024-06-10T16:00:00.000Z",
            "description": "Kite",
            "imageUri": "file:///data/photo.jpg",
            "location": {
                "latitude": 55.6761,
                "longitude": 12.5683,
                "altitude": 14.2,
                "accuracy": 5.0,
                "heading": -1,
                "speed": 0
            }
        }"#;
        let record: ObservationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.location, Some(Location::new(55.6761, 12.5683)));
        assert_eq!(record.image_uri.as_deref(), Some("file:///data/photo.jpg"));
    }

    #[test]
    fn test_missing_optionals_are_none() {
        let json = r#"{"id":"1","timestamp":"2024-06-10T16:00:00.000Z","description":"x"}"#;
        let record: ObservationRecord = serde_json::from_str(json).unwrap();
        assert!(record.image_uri.is_none());
        assert!(record.location.is_none());
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let json = r#"{"id":"1","timestamp":"yesterday","description":"x"}"#;
        assert!(serde_json::from_str::<ObservationRecord>(json).is_err());
    }

    #[test]
    fn test_summary_uses_placeholder_for_empty_description() {
        let record = ObservationRecord::new("", Some("file://x.jpg".into()), None);
        assert!(record.summary().starts_with(NO_DESCRIPTION));

        let record = ObservationRecord::new("Hawk", None, None);
        assert!(record.summary().starts_with("Hawk ("));
    }

    #[test]
    fn test_details_lists_every_field() {
        let record = ObservationRecord::new(
            "Hawk",
            Some("file://hawk.jpg".into()),
            Some(Location::new(55.676_098, 12.568_337)),
        );
        let details = record.details();
        assert!(details.contains(&record.id));
        assert!(details.contains("Hawk"));
        assert!(details.contains("file://hawk.jpg"));
        assert!(details.contains("Lat 55.6761, Lon 12.5683"));
    }

    #[test]
    fn test_details_marks_missing_optionals() {
        let details = ObservationRecord::new("", None, None).details();
        assert_eq!(details.lines().count(), 5);
        assert!(details.contains(&format!("Description: {NO_DESCRIPTION}")));
        assert!(details.contains("Photo:       none"));
        assert!(details.contains("Location:    none"));
    }

    #[test]
    fn test_location_validity() {
        assert!(Location::new(55.6761, 12.5683).is_valid());
        assert!(Location::new(-90.0, 180.0).is_valid());
        assert!(!Location::new(91.0, 0.0).is_valid());
        assert!(!Location::new(0.0, -181.0).is_valid());
        assert!(!Location::new(f64::NAN, 0.0).is_valid());
    }
}
