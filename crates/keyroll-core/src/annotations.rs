//! Opaque monitoring annotations attached to a primitive set.
//!
//! Monitoring clients use these to label the events they record (for
//! example the keyset name). The primitive set stores and returns them
//! verbatim and never looks inside.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

/// Immutable string-to-string map.
///
/// Cloning is cheap; clones share the same map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitoringAnnotations {
    entries: Arc<BTreeMap<String, String>>,
}

impl MonitoringAnnotations {
    /// Annotations with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a set of annotations.
    pub fn builder() -> MonitoringAnnotationsBuilder {
        MonitoringAnnotationsBuilder::default()
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl From<BTreeMap<String, String>> for MonitoringAnnotations {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries: Arc::new(entries) }
    }
}

/// Builder for [`MonitoringAnnotations`].
#[derive(Debug, Default)]
pub struct MonitoringAnnotationsBuilder {
    entries: BTreeMap<String, String>,
}

impl MonitoringAnnotationsBuilder {
    /// Add an entry, replacing any previous value for `key`.
    #[must_use]
    pub fn add(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Finish building.
    pub fn build(self) -> MonitoringAnnotations {
        MonitoringAnnotations::from(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_entries() {
        let annotations = MonitoringAnnotations::builder()
            .add("keyset", "payments")
            .add("region", "eu")
            .add("keyset", "billing")
            .build();

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations.get("keyset"), Some("billing"));
        assert_eq!(annotations.iter().collect::<Vec<_>>(), vec![
            ("keyset", "billing"),
            ("region", "eu")
        ]);
    }

    #[test]
    fn empty_annotations() {
        assert!(MonitoringAnnotations::empty().is_empty());
        assert_eq!(MonitoringAnnotations::empty(), MonitoringAnnotations::builder().build());
    }

    #[test]
    fn cbor_roundtrip() {
        let annotations = MonitoringAnnotations::builder().add("keyset", "payments").build();

        let mut buf = Vec::new();
        ciborium::into_writer(&annotations, &mut buf).unwrap();
        let decoded: MonitoringAnnotations = ciborium::from_reader(buf.as_slice()).unwrap();

        assert_eq!(decoded, annotations);
    }
}
