/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the store layer and the UI layer.

use chrono::{DateTime, Local, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum number of photos kept in the collection (oldest are dropped)
pub const MAX_PHOTOS: usize = 30;

/// Description used when the user leaves the field blank
pub const DEFAULT_DESCRIPTION: &str = "Uploaded photo";

/// Unique identifier of a photo record, assigned once at creation
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhotoId(Uuid);

impl PhotoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhotoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Represents a single photo in the gallery
///
/// Field names on disk (`desc`, `time`, `displayTime`) are kept stable so
/// existing blobs keep loading.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PhotoRecord {
    /// Assigned on creation; blobs written without ids get one on load
    #[serde(default)]
    pub id: PhotoId,
    /// Self-contained `data:<mime>;base64,...` encoding of the image
    pub data: String,
    #[serde(rename = "desc", default = "default_description")]
    pub description: String,
    #[serde(rename = "time", with = "iso_millis")]
    pub captured_at: DateTime<Utc>,
    #[serde(rename = "displayTime", default)]
    pub display_time: String,
}

impl PhotoRecord {
    /// Build a new record captured at `captured_at`
    pub fn new(data: String, description: &str, captured_at: DateTime<Utc>) -> Self {
        // Stored instants only carry milliseconds
        let captured_at = captured_at.trunc_subsecs(3);
        let description = match description.trim() {
            "" => DEFAULT_DESCRIPTION.to_string(),
            text => text.to_string(),
        };

        Self {
            id: PhotoId::new(),
            data,
            description,
            captured_at,
            display_time: format_display_time(captured_at),
        }
    }

    /// Human-readable time, recomputed when the stored label is missing
    pub fn time_label(&self) -> String {
        if self.display_time.is_empty() {
            format_display_time(self.captured_at)
        } else {
            self.display_time.clone()
        }
    }
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

/// Render an instant in local time, e.g. `2024/5/1 14:03`
pub fn format_display_time(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y/%-m/%-d %H:%M")
        .to_string()
}

/// Ordered photo records, newest first, never longer than [`MAX_PHOTOS`]
/// after an insert
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct PhotoCollection {
    records: Vec<PhotoRecord>,
}

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&PhotoRecord> {
        self.records.first()
    }

    pub fn get(&self, id: PhotoId) -> Option<&PhotoRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn position(&self, id: PhotoId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Insert at the head and drop whatever falls past the cap
    pub fn prepend(&mut self, record: PhotoRecord) {
        self.records.insert(0, record);
        self.records.truncate(MAX_PHOTOS);
    }

    /// Remove every record with `id`, returning how many went away
    pub fn remove(&mut self, id: PhotoId) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        before - self.records.len()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored blob record by record. Records that fail to parse are
    /// left out and counted, so one bad entry does not hide the rest.
    pub fn from_json_lenient(json: &str) -> Result<(Self, usize), serde_json::Error> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let total = raw.len();
        let records: Vec<PhotoRecord> = raw
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect();

        let skipped = total - records.len();
        Ok((Self { records }, skipped))
    }
}

impl From<Vec<PhotoRecord>> for PhotoCollection {
    fn from(records: Vec<PhotoRecord>) -> Self {
        Self { records }
    }
}

/// ISO-8601 instants with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(data: &str) -> PhotoRecord {
        PhotoRecord::new(data.to_string(), "", Utc::now())
    }

    #[test]
    fn test_blank_description_uses_default() {
        let photo = PhotoRecord::new("data:image/png;base64,AA==".into(), "   ", Utc::now());
        assert_eq!(photo.description, DEFAULT_DESCRIPTION);
        assert!(!photo.display_time.is_empty());
    }

    #[test]
    fn test_prepend_keeps_newest_first_and_caps() {
        let mut photos = PhotoCollection::new();
        let mut ids = Vec::new();
        for i in 0..MAX_PHOTOS + 1 {
            let photo = record(&format!("photo-{i}"));
            ids.push(photo.id);
            photos.prepend(photo);
        }

        assert_eq!(photos.len(), MAX_PHOTOS);
        assert_eq!(photos.first().map(|p| p.id), ids.last().copied());
        assert!(photos.get(ids[0]).is_none());
        assert!(photos.get(ids[1]).is_some());
    }

    #[test]
    fn test_remove_counts_matches() {
        let mut photos = PhotoCollection::new();
        let keep = record("a");
        let drop = record("b");
        photos.prepend(keep.clone());
        photos.prepend(drop.clone());

        assert_eq!(photos.remove(PhotoId::new()), 0);
        assert_eq!(photos.len(), 2);
        assert_eq!(photos.remove(drop.id), 1);
        assert_eq!(photos.len(), 1);
        assert_eq!(photos.first(), Some(&keep));
    }

    #[test]
    fn test_blob_field_names() {
        let captured = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let photo = PhotoRecord::new("data:image/png;base64,AA==".into(), "sunset", captured);
        let json = PhotoCollection::from(vec![photo]).to_json().unwrap();

        assert!(json.contains("\"desc\":\"sunset\""));
        assert!(json.contains("\"time\":\"2024-05-01T12:30:00.000Z\""));
        assert!(json.contains("\"displayTime\":"));
    }

    #[test]
    fn test_lenient_parse_skips_bad_records() {
        let json = r#"[
            {"id":"6f1c1d36-9a3e-4d7a-a0e4-0b5b1d1c7e11","data":"data:image/png;base64,AA==","desc":"good","time":"2024-05-01T12:30:00.000Z"},
            {"data":"data:image/png;base64,AA==","desc":"bad","time":"2024-05-01 12:30"}
        ]"#;

        assert!(serde_json::from_str::<PhotoCollection>(json).is_err());

        let (photos, skipped) = PhotoCollection::from_json_lenient(json).unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(photos.len(), 1);
        assert_eq!(photos.first().unwrap().description, "good");

        assert!(PhotoCollection::from_json_lenient("{not json").is_err());
    }

    #[test]
    fn test_legacy_record_without_id_or_display_time() {
        let json = r#"[{"data":"data:image/png;base64,AA==","time":"2024-05-01T12:30:00.000Z"}]"#;
        let (photos, skipped) = PhotoCollection::from_json_lenient(json).unwrap();
        assert_eq!(skipped, 0);
        let photo = photos.first().unwrap();

        assert_eq!(photo.description, DEFAULT_DESCRIPTION);
        assert!(photo.display_time.is_empty());
        assert_eq!(photo.time_label(), format_display_time(photo.captured_at));
    }
}
