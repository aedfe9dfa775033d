//! Immutable, prefix-indexed set of primitives.
//!
//! The set maps each ciphertext prefix to the entries whose keys produce it.
//! Prefixes are not unique: every RAW key shares the empty prefix, and two
//! keys of a keyset may collide on id during a rotation. Lookups therefore
//! return an ordered list of candidates the caller tries in turn.
//!
//! # Invariants
//!
//! - Every entry appears exactly once in keyset order and exactly once in the
//!   prefix index, under its own identifier
//! - Entries sharing an identifier are listed in the order they were added
//! - At most one entry is primary, and it is also present in both views
//! - Nothing is mutable after [`crate::Builder::build`]

use std::{any, collections::HashMap, fmt, sync::Arc};

use keyroll_proto::RAW_PREFIX;

use crate::{annotations::MonitoringAnnotations, builder::Builder, entry::Entry, prefix::Prefix};

/// Immutable list of entries sharing one identifier.
///
/// A new list replaces the old one whenever an entry joins the group, so a
/// list that has been handed out never changes.
pub type EntryList<P> = Arc<[Arc<Entry<P>>]>;

/// A keyset's primitives, indexed by ciphertext prefix.
///
/// Built once through [`Builder`], then read concurrently. The set is
/// `Send + Sync` whenever `P` is.
pub struct PrimitiveSet<P> {
    /// Identifier → entries sharing it, in insertion order
    primitives: HashMap<Prefix, EntryList<P>>,
    /// Every entry, in insertion order
    in_keyset_order: Arc<[Arc<Entry<P>>]>,
    primary: Option<Arc<Entry<P>>>,
    annotations: MonitoringAnnotations,
}

impl<P> PrimitiveSet<P> {
    /// Start building a set whose keys are parsed by `parser`.
    pub fn builder(parser: Arc<dyn crate::KeyParser>) -> Builder<P> {
        Builder::new(parser)
    }

    pub(crate) fn from_parts(
        primitives: HashMap<Prefix, EntryList<P>>,
        in_keyset_order: Vec<Arc<Entry<P>>>,
        primary: Option<Arc<Entry<P>>>,
        annotations: MonitoringAnnotations,
    ) -> Self {
        Self { primitives, in_keyset_order: in_keyset_order.into(), primary, annotations }
    }

    /// The primary entry, used for new operations.
    ///
    /// `None` if the builder never designated one; whether that is acceptable
    /// is up to the caller.
    pub fn primary(&self) -> Option<&Arc<Entry<P>>> {
        self.primary.as_ref()
    }

    /// Entries whose identifier equals `identifier`, in insertion order.
    ///
    /// Empty if no entry has that identifier.
    pub fn primitive(&self, identifier: &[u8]) -> &[Arc<Entry<P>>] {
        self.primitives.get(identifier).map(|entries| &**entries).unwrap_or(&[])
    }

    /// Entries of RAW keys, in insertion order.
    pub fn raw_primitives(&self) -> &[Arc<Entry<P>>] {
        self.primitive(RAW_PREFIX)
    }

    /// Every identifier group. Groups come in no particular order.
    pub fn all(&self) -> impl Iterator<Item = &[Arc<Entry<P>>]> {
        self.primitives.values().map(|entries| &**entries)
    }

    /// Every entry, in the order the keyset listed them.
    pub fn all_in_keyset_order(&self) -> &[Arc<Entry<P>>] {
        &self.in_keyset_order
    }

    /// Whether any monitoring annotations were attached.
    ///
    /// An empty annotation map counts as none.
    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }

    /// Monitoring annotations attached at build time.
    pub fn annotations(&self) -> &MonitoringAnnotations {
        &self.annotations
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.in_keyset_order.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.in_keyset_order.is_empty()
    }

    /// Name of the primitive type held by this set.
    pub fn primitive_type_name(&self) -> &'static str {
        any::type_name::<P>()
    }
}

impl<P> fmt::Debug for PrimitiveSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefixes: Vec<&Prefix> = self.primitives.keys().collect();
        prefixes.sort_unstable();
        f.debug_struct("PrimitiveSet")
            .field("primitive_type", &self.primitive_type_name())
            .field("entries", &self.in_keyset_order.len())
            .field("prefixes", &prefixes)
            .field("primary", &self.primary.as_ref().map(|entry| entry.key_id()))
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// Append `entry` to the keyset-ordered list and to its identifier group.
///
/// The group's list is replaced with a fresh one rather than grown in place.
pub(crate) fn store_entry<P>(
    entry: Arc<Entry<P>>,
    primitives: &mut HashMap<Prefix, EntryList<P>>,
    in_keyset_order: &mut Vec<Arc<Entry<P>>>,
) {
    let group: EntryList<P> = match primitives.get(entry.prefix().as_bytes()) {
        Some(existing) => existing.iter().cloned().chain([Arc::clone(&entry)]).collect(),
        None => Arc::from([Arc::clone(&entry)]),
    };
    primitives.insert(entry.prefix().clone(), group);
    in_keyset_order.push(entry);
}
