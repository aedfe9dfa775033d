//! A single member of a primitive set.

use std::{any::Any, fmt, sync::Arc};

use keyroll_proto::{KeyStatus, KeysetKey, OutputPrefixType, output_prefix};

use crate::{
    error::PrimitiveSetError,
    key::{Key, Parameters, ProtoKeySerialization, SecretKeyAccess},
    prefix::Prefix,
    registry::KeyParser,
};

/// The primitive instances backing one key.
///
/// A *full* primitive is self-sufficient: it knows its key's output prefix
/// and produces or strips it itself. A *raw* primitive ignores the prefix;
/// the wrapping code adds and removes it. Keys may supply either or both,
/// never neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitives<P> {
    /// Only the prefix-aware primitive
    Full(P),
    /// Only the prefix-ignoring primitive
    Raw(P),
    /// Both variants
    Both {
        /// Prefix-aware primitive
        full: P,
        /// Prefix-ignoring primitive
        raw: P,
    },
}

impl<P> Primitives<P> {
    /// Combine optional variants. `None` if both are absent.
    pub fn new(full: Option<P>, raw: Option<P>) -> Option<Self> {
        match (full, raw) {
            (Some(full), Some(raw)) => Some(Self::Both { full, raw }),
            (Some(full), None) => Some(Self::Full(full)),
            (None, Some(raw)) => Some(Self::Raw(raw)),
            (None, None) => None,
        }
    }

    /// The prefix-aware primitive, if supplied.
    pub fn full(&self) -> Option<&P> {
        match self {
            Self::Full(full) | Self::Both { full, .. } => Some(full),
            Self::Raw(_) => None,
        }
    }

    /// The prefix-ignoring primitive, if supplied.
    pub fn raw(&self) -> Option<&P> {
        match self {
            Self::Raw(raw) | Self::Both { raw, .. } => Some(raw),
            Self::Full(_) => None,
        }
    }
}

/// One (primitive, key) association.
///
/// Immutable after construction. Entries are shared between the set's
/// prefix index, its keyset-ordered list and its primary slot, so they are
/// handed out as `Arc<Entry<P>>`.
pub struct Entry<P> {
    primitives: Primitives<P>,
    identifier: Prefix,
    status: KeyStatus,
    output_prefix_type: OutputPrefixType,
    key_id: u32,
    key_type: String,
    key: Arc<dyn Key>,
}

impl<P> Entry<P> {
    /// Build the entry for `keyset_key`.
    ///
    /// The caller has already checked that the key is `ENABLED`. Computes the
    /// key's ciphertext prefix and asks `parser` for the parsed key object.
    ///
    /// # Errors
    ///
    /// - `PrimitiveSetError::InvalidPrefix` if the output prefix type is
    ///   unknown
    /// - `PrimitiveSetError::KeyParse` if `parser` rejects the key material
    pub fn create(
        primitives: Primitives<P>,
        keyset_key: &KeysetKey,
        parser: &dyn KeyParser,
    ) -> Result<Self, PrimitiveSetError> {
        let key_id = keyset_key.key_id;
        let identifier = output_prefix(keyset_key)
            .map_err(|source| PrimitiveSetError::InvalidPrefix { key_id, source })?;

        let key = ProtoKeySerialization::from_keyset_key(keyset_key)
            .and_then(|serialization| {
                parser.parse_key(&serialization, SecretKeyAccess::insecure())
            })
            .map_err(|source| PrimitiveSetError::KeyParse { key_id, source })?;

        Ok(Self {
            primitives,
            identifier: Prefix::from(identifier),
            status: keyset_key.status,
            output_prefix_type: keyset_key.output_prefix_type,
            key_id,
            key_type: keyset_key.key_data.type_url.clone(),
            key,
        })
    }

    /// Both primitive variants.
    pub fn primitives(&self) -> &Primitives<P> {
        &self.primitives
    }

    /// The self-sufficient, prefix-aware primitive.
    pub fn full_primitive(&self) -> Option<&P> {
        self.primitives.full()
    }

    /// The primitive that ignores the output prefix and assumes RAW.
    pub fn primitive(&self) -> Option<&P> {
        self.primitives.raw()
    }

    /// Copy of the ciphertext prefix identifying this entry.
    pub fn identifier(&self) -> Vec<u8> {
        self.identifier.to_vec()
    }

    /// The ciphertext prefix identifying this entry.
    pub fn prefix(&self) -> &Prefix {
        &self.identifier
    }

    /// Key status. Always `ENABLED` for entries of a built set.
    pub fn status(&self) -> KeyStatus {
        self.status
    }

    /// Output prefix type of the key.
    pub fn output_prefix_type(&self) -> OutputPrefixType {
        self.output_prefix_type
    }

    /// Key id from the keyset.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Type URL of the key.
    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    /// Parsed key object.
    pub fn key(&self) -> &Arc<dyn Key> {
        &self.key
    }

    /// Parameters of the parsed key.
    pub fn parameters(&self) -> &dyn Parameters {
        self.key.parameters()
    }

    /// Parsed key as its concrete type. `None` if it is another type.
    pub fn key_as<K: Key>(&self) -> Option<&K> {
        let key: &dyn Any = &*self.key;
        key.downcast_ref::<K>()
    }
}

impl<P> fmt::Debug for Entry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key_id", &self.key_id)
            .field("identifier", &self.identifier)
            .field("status", &self.status)
            .field("output_prefix_type", &self.output_prefix_type)
            .field("key_type", &self.key_type)
            .field("full_primitive", &self.primitives.full().is_some())
            .field("primitive", &self.primitives.raw().is_some())
            .finish_non_exhaustive()
    }
}
