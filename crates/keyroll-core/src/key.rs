//! Parsed key objects and the serialized form they are parsed from.
//!
//! A primitive set does not interpret key material. It hands each key's
//! [`ProtoKeySerialization`] to an injected [`crate::KeyParser`] and stores
//! whatever [`Key`] comes back, so callers can later inspect the key's
//! parameters or downcast to the concrete key type.

use std::{any::Any, fmt};

use keyroll_proto::{KeyMaterialType, KeysetKey, OutputPrefixType, id_requirement};
use zeroize::Zeroizing;

use crate::error::KeyParseError;

/// Parameters of a key: everything except the key material itself.
pub trait Parameters: fmt::Debug + Send + Sync {
    /// Whether keys with these parameters bind their id into ciphertexts.
    fn has_id_requirement(&self) -> bool;
}

/// A fully parsed key.
///
/// Implementations are immutable. Use [`crate::Entry::key_as`] to recover the
/// concrete type.
pub trait Key: Any + fmt::Debug + Send + Sync {
    /// Parameters of this key.
    fn parameters(&self) -> &dyn Parameters;

    /// Key id bound into ciphertexts, `None` for RAW keys.
    fn id_requirement(&self) -> Option<u32>;
}

/// Capability token required to read secret key material.
///
/// Holding one is a statement by the caller that exposing secret bytes is
/// intended at this call site.
#[derive(Debug, Clone, Copy)]
pub struct SecretKeyAccess {
    _private: (),
}

impl SecretKeyAccess {
    /// Grant access to secret key material.
    pub fn insecure() -> Self {
        Self { _private: () }
    }
}

/// Serialized key as handed to a [`crate::KeyParser`].
///
/// # Invariants
///
/// - RAW keys have no id requirement; every other output prefix type has one
/// - `value` is zeroized on drop and never printed by `Debug`
#[derive(Clone, PartialEq, Eq)]
pub struct ProtoKeySerialization {
    type_url: String,
    value: Zeroizing<Vec<u8>>,
    key_material_type: KeyMaterialType,
    output_prefix_type: OutputPrefixType,
    id_requirement: Option<u32>,
}

impl ProtoKeySerialization {
    /// Create a serialization, checking the id requirement against the
    /// output prefix type.
    pub fn create(
        type_url: impl Into<String>,
        value: &[u8],
        key_material_type: KeyMaterialType,
        output_prefix_type: OutputPrefixType,
        id_requirement: Option<u32>,
    ) -> Result<Self, KeyParseError> {
        let is_raw = output_prefix_type == OutputPrefixType::Raw;
        if is_raw == id_requirement.is_some() {
            return Err(KeyParseError::InconsistentIdRequirement {
                output_prefix_type,
                id_requirement,
            });
        }

        Ok(Self {
            type_url: type_url.into(),
            value: Zeroizing::new(value.to_vec()),
            key_material_type,
            output_prefix_type,
            id_requirement,
        })
    }

    /// Serialization of a keyset key, with the id requirement its output
    /// prefix type implies.
    pub fn from_keyset_key(key: &KeysetKey) -> Result<Self, KeyParseError> {
        Self::create(
            key.key_data.type_url.as_str(),
            &key.key_data.value,
            key.key_data.key_material_type,
            key.output_prefix_type,
            id_requirement(key),
        )
    }

    /// Type URL naming the serialization format.
    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    /// Serialized key bytes.
    pub fn value(&self, _access: SecretKeyAccess) -> &[u8] {
        &self.value
    }

    /// Kind of key material.
    pub fn key_material_type(&self) -> KeyMaterialType {
        self.key_material_type
    }

    /// Output prefix type of the key.
    pub fn output_prefix_type(&self) -> OutputPrefixType {
        self.output_prefix_type
    }

    /// Key id bound into ciphertexts, `None` for RAW keys.
    pub fn id_requirement(&self) -> Option<u32> {
        self.id_requirement
    }
}

impl fmt::Debug for ProtoKeySerialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtoKeySerialization")
            .field("type_url", &self.type_url)
            .field("value", &format_args!("<{} bytes redacted>", self.value.len()))
            .field("key_material_type", &self.key_material_type)
            .field("output_prefix_type", &self.output_prefix_type)
            .field("id_requirement", &self.id_requirement)
            .finish()
    }
}
