//! Load schedule: an ordered list of time slices and their TPS targets

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One scheduled interval with its TPS target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceEntry {
    /// Slice label, used for ordering and logging only
    pub label: String,

    /// Target transactions per second for this slice
    pub tps: u32,
}

impl SliceEntry {
    pub fn new(label: impl Into<String>, tps: u32) -> Self {
        Self {
            label: label.into(),
            tps,
        }
    }
}

/// Ordered sequence of slices.
///
/// Deserializes from either a map of `label -> tps` (kept in document order)
/// or a list of `{label, tps}` objects. Serializes back to the map form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    entries: Vec<SliceEntry>,
}

impl Schedule {
    pub fn new(entries: Vec<SliceEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SliceEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SliceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all slice targets
    pub fn total_tps(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.tps)).sum()
    }

    /// Label that appears more than once, if any
    pub fn duplicate_label(&self) -> Option<&str> {
        self.entries.iter().enumerate().find_map(|(i, entry)| {
            self.entries[..i]
                .iter()
                .any(|prev| prev.label == entry.label)
                .then_some(entry.label.as_str())
        })
    }

    pub fn push(&mut self, entry: SliceEntry) {
        self.entries.push(entry);
    }
}

impl FromIterator<SliceEntry> for Schedule {
    fn from_iter<I: IntoIterator<Item = SliceEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a SliceEntry;
    type IntoIter = std::slice::Iter<'a, SliceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Schedule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.label, &entry.tps)?;
        }
        map.end()
    }
}

struct ScheduleVisitor;

impl<'de> Visitor<'de> for ScheduleVisitor {
    type Value = Schedule;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of slice label to TPS or a list of {label, tps} entries")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut schedule = Schedule::default();
        while let Some((label, tps)) = access.next_entry::<String, u32>()? {
            if schedule.entries.iter().any(|e| e.label == label) {
                return Err(de::Error::custom(format!("duplicate slice label '{}'", label)));
            }
            schedule.push(SliceEntry { label, tps });
        }
        Ok(schedule)
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut schedule = Schedule::default();
        while let Some(entry) = access.next_element::<SliceEntry>()? {
            schedule.push(entry);
        }
        Ok(schedule)
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ScheduleVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_document_order() {
        let json = r#"{"3": 300, "1": 100, "2": 0}"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();

        let labels: Vec<&str> = schedule.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["3", "1", "2"]);
        assert_eq!(schedule.total_tps(), 400);
    }

    #[test]
    fn test_list_form() {
        let json = r#"[{"label": "warmup", "tps": 10}, {"label": "peak", "tps": 1000}]"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.entries()[1], SliceEntry::new("peak", 1000));
    }

    #[test]
    fn test_duplicate_label_in_map_rejected() {
        let json = r#"{"1": 100, "1": 200}"#;
        assert!(serde_json::from_str::<Schedule>(json).is_err());
    }

    #[test]
    fn test_duplicate_label_in_list_reported() {
        let schedule = Schedule::new(vec![SliceEntry::new("a", 1), SliceEntry::new("a", 2)]);
        assert_eq!(schedule.duplicate_label(), Some("a"));
    }

    #[test]
    fn test_negative_tps_rejected() {
        assert!(serde_json::from_str::<Schedule>(r#"{"1": -5}"#).is_err());
    }

    #[test]
    fn test_serializes_as_map() {
        let schedule = Schedule::new(vec![SliceEntry::new("b", 2), SliceEntry::new("a", 1)]);
        let json = serde_json::to_string(&schedule).unwrap();
        assert_eq!(json, r#"{"b":2,"a":1}"#);
    }
}
