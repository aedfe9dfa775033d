//! Builder for [`PrimitiveSet`].
//!
//! The builder is a two-state machine:
//!
//! ```text
//! Open(scratch) ──build()──▶ Sealed
//! ```
//!
//! While open it accumulates entries; `build()` moves the scratch state into
//! the finished set and leaves `Sealed` behind. Every operation on a sealed
//! builder fails with [`PrimitiveSetError::Sealed`].
//!
//! # Invariants
//!
//! - A failed call leaves the accumulated state exactly as it was: all
//!   validation, including key parsing, happens before anything is stored
//! - At most one entry is ever designated primary
//! - `build()` succeeds at most once

use std::{collections::HashMap, fmt, mem, sync::Arc};

use keyroll_proto::{KeyStatus, KeysetKey};

use crate::{
    annotations::MonitoringAnnotations,
    entry::{Entry, Primitives},
    error::PrimitiveSetError,
    prefix::Prefix,
    primitive_set::{EntryList, PrimitiveSet, store_entry},
    registry::KeyParser,
};

/// Incrementally assembles a [`PrimitiveSet`].
///
/// Mutators take `&mut self`, so a builder has a single writer. Build it on
/// one thread, then share the resulting set.
pub struct Builder<P> {
    parser: Arc<dyn KeyParser>,
    state: BuilderState<P>,
}

enum BuilderState<P> {
    Open(Scratch<P>),
    Sealed,
}

struct Scratch<P> {
    primitives: HashMap<Prefix, EntryList<P>>,
    in_keyset_order: Vec<Arc<Entry<P>>>,
    primary: Option<Arc<Entry<P>>>,
    annotations: MonitoringAnnotations,
}

impl<P> Default for Scratch<P> {
    fn default() -> Self {
        Self {
            primitives: HashMap::new(),
            in_keyset_order: Vec::new(),
            primary: None,
            annotations: MonitoringAnnotations::empty(),
        }
    }
}

impl<P> Builder<P> {
    /// Create an open builder whose keys are parsed by `parser`.
    pub fn new(parser: Arc<dyn KeyParser>) -> Self {
        Self { parser, state: BuilderState::Open(Scratch::default()) }
    }

    /// Whether `build()` has already been called.
    pub fn is_sealed(&self) -> bool {
        matches!(self.state, BuilderState::Sealed)
    }

    /// Add a non-primary entry backed by a raw primitive.
    pub fn add_primitive(
        &mut self,
        primitive: P,
        key: &KeysetKey,
    ) -> Result<&mut Self, PrimitiveSetError> {
        self.add(Primitives::new(None, Some(primitive)), key, false, "add_primitive")?;
        Ok(self)
    }

    /// Add the primary entry backed by a raw primitive.
    ///
    /// This or [`Self::add_primary_full_primitive_and_optional_primitive`]
    /// may succeed at most once per builder.
    pub fn add_primary_primitive(
        &mut self,
        primitive: P,
        key: &KeysetKey,
    ) -> Result<&mut Self, PrimitiveSetError> {
        self.add(Primitives::new(None, Some(primitive)), key, true, "add_primary_primitive")?;
        Ok(self)
    }

    /// Add a non-primary entry with a full primitive, a raw primitive, or
    /// both.
    pub fn add_full_primitive_and_optional_primitive(
        &mut self,
        full_primitive: Option<P>,
        primitive: Option<P>,
        key: &KeysetKey,
    ) -> Result<&mut Self, PrimitiveSetError> {
        self.add(
            Primitives::new(full_primitive, primitive),
            key,
            false,
            "add_full_primitive_and_optional_primitive",
        )?;
        Ok(self)
    }

    /// Add the primary entry with a full primitive, a raw primitive, or both.
    ///
    /// This or [`Self::add_primary_primitive`] may succeed at most once per
    /// builder.
    pub fn add_primary_full_primitive_and_optional_primitive(
        &mut self,
        full_primitive: Option<P>,
        primitive: Option<P>,
        key: &KeysetKey,
    ) -> Result<&mut Self, PrimitiveSetError> {
        self.add(
            Primitives::new(full_primitive, primitive),
            key,
            true,
            "add_primary_full_primitive_and_optional_primitive",
        )?;
        Ok(self)
    }

    /// Replace the monitoring annotations.
    pub fn set_annotations(
        &mut self,
        annotations: MonitoringAnnotations,
    ) -> Result<&mut Self, PrimitiveSetError> {
        self.scratch_mut("set_annotations")?.annotations = annotations;
        Ok(self)
    }

    /// Produce the set and seal the builder.
    ///
    /// A set without a primary is accepted.
    ///
    /// # Errors
    ///
    /// - `PrimitiveSetError::Sealed` if called a second time
    pub fn build(&mut self) -> Result<PrimitiveSet<P>, PrimitiveSetError> {
        let BuilderState::Open(scratch) = mem::replace(&mut self.state, BuilderState::Sealed)
        else {
            return Err(PrimitiveSetError::Sealed { operation: "build" });
        };

        tracing::debug!(
            entries = scratch.in_keyset_order.len(),
            prefixes = scratch.primitives.len(),
            primary = ?scratch.primary.as_ref().map(|entry| entry.key_id()),
            "primitive set built"
        );

        Ok(PrimitiveSet::from_parts(
            scratch.primitives,
            scratch.in_keyset_order,
            scratch.primary,
            scratch.annotations,
        ))
    }

    /// Validate, create and store one entry.
    ///
    /// Every check runs before the scratch state is touched.
    fn add(
        &mut self,
        primitives: Option<Primitives<P>>,
        key: &KeysetKey,
        as_primary: bool,
        operation: &'static str,
    ) -> Result<(), PrimitiveSetError> {
        let result = self.try_add(primitives, key, as_primary, operation);
        if let Err(err) = &result {
            tracing::debug!(key_id = key.key_id, operation, error = %err, "rejected key");
        }
        result
    }

    fn try_add(
        &mut self,
        primitives: Option<Primitives<P>>,
        key: &KeysetKey,
        as_primary: bool,
        operation: &'static str,
    ) -> Result<(), PrimitiveSetError> {
        let parser = Arc::clone(&self.parser);
        let scratch = self.scratch_mut(operation)?;

        let primitives =
            primitives.ok_or(PrimitiveSetError::MissingPrimitive { key_id: key.key_id })?;

        if key.status != KeyStatus::Enabled {
            return Err(PrimitiveSetError::KeyNotEnabled { key_id: key.key_id, status: key.status });
        }

        if as_primary && let Some(existing) = &scratch.primary {
            return Err(PrimitiveSetError::DuplicatePrimary {
                existing: existing.key_id(),
                attempted: key.key_id,
            });
        }

        let entry = Arc::new(Entry::create(primitives, key, parser.as_ref())?);

        tracing::debug!(
            key_id = entry.key_id(),
            prefix = %entry.prefix(),
            primary = as_primary,
            "added key to primitive set"
        );

        if as_primary {
            scratch.primary = Some(Arc::clone(&entry));
        }
        store_entry(entry, &mut scratch.primitives, &mut scratch.in_keyset_order);
        Ok(())
    }

    fn scratch_mut(&mut self, operation: &'static str) -> Result<&mut Scratch<P>, PrimitiveSetError> {
        match &mut self.state {
            BuilderState::Open(scratch) => Ok(scratch),
            BuilderState::Sealed => Err(PrimitiveSetError::Sealed { operation }),
        }
    }
}

impl<P> fmt::Debug for Builder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            BuilderState::Open(scratch) => f
                .debug_struct("Builder")
                .field("state", &"open")
                .field("entries", &scratch.in_keyset_order.len())
                .field("primary", &scratch.primary.as_ref().map(|entry| entry.key_id()))
                .finish_non_exhaustive(),
            BuilderState::Sealed => {
                f.debug_struct("Builder").field("state", &"sealed").finish_non_exhaustive()
            },
        }
    }
}
