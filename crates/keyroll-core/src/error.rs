//! Error types for primitive sets and key parsing.
//!
//! Two families: security errors say something about the *data* (a key that
//! is disabled, malformed or unparseable) and may be reported per key;
//! illegal-state errors say the builder was driven out of order and point at
//! a bug in the caller.

use keyroll_proto::{KeyStatus, ProtocolError};
use thiserror::Error;

/// Errors from building a primitive set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveSetError {
    /// Neither the full primitive nor the raw primitive was supplied
    #[error("key {key_id}: at least one of the full primitive or primitive must be set")]
    MissingPrimitive {
        /// Key the primitives were supplied for
        key_id: u32,
    },

    /// Only `ENABLED` keys can back a primitive
    #[error("key {key_id}: only ENABLED keys may be added, got {status}")]
    KeyNotEnabled {
        /// Offending key
        key_id: u32,
        /// Status found on the key
        status: KeyStatus,
    },

    /// The key's ciphertext prefix could not be computed
    #[error("key {key_id}: {source}")]
    InvalidPrefix {
        /// Offending key
        key_id: u32,
        /// Underlying format error
        source: ProtocolError,
    },

    /// The injected parser rejected the key material
    #[error("key {key_id}: failed to parse key material: {source}")]
    KeyParse {
        /// Offending key
        key_id: u32,
        /// Underlying parser error
        source: KeyParseError,
    },

    /// A primary was already designated in this build
    #[error("primary already set to key {existing}, cannot also set key {attempted}")]
    DuplicatePrimary {
        /// Key that is already primary
        existing: u32,
        /// Key that was offered as a second primary
        attempted: u32,
    },

    /// The builder has already produced its set
    #[error("{operation} cannot be called after build")]
    Sealed {
        /// Builder operation that was attempted
        operation: &'static str,
    },
}

impl PrimitiveSetError {
    /// Returns true if this error reports builder misuse rather than bad data.
    ///
    /// Illegal-state errors are not recoverable by skipping a key; the caller
    /// drove the builder out of order.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::DuplicatePrimary { .. } | Self::Sealed { .. })
    }

    /// Returns true if this error rejects a specific key's data.
    pub fn is_security(&self) -> bool {
        !self.is_illegal_state()
    }
}

/// Errors from turning serialized key material into a key object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// No parser is registered for the type URL
    #[error("no key parser registered for {type_url}")]
    UnknownTypeUrl {
        /// Type URL that was looked up
        type_url: String,
    },

    /// The parser understood the type but not the bytes
    #[error("malformed key material for {type_url}: {reason}")]
    Malformed {
        /// Type URL of the key
        type_url: String,
        /// Why the parser rejected it
        reason: String,
    },

    /// RAW keys must not carry an id requirement, all others must
    #[error("output prefix type {output_prefix_type} is inconsistent with id requirement {id_requirement:?}")]
    InconsistentIdRequirement {
        /// Output prefix type of the serialization
        output_prefix_type: keyroll_proto::OutputPrefixType,
        /// Id requirement that was supplied
        id_requirement: Option<u32>,
    },

    /// Secret key material was requested without an access token
    #[error("access to secret key material of {type_url} requires SecretKeyAccess")]
    SecretAccessRequired {
        /// Type URL of the key
        type_url: String,
    },

    /// A different parser is already registered for the type URL
    #[error("a different key parser is already registered for {type_url}")]
    DuplicateParser {
        /// Type URL that was being registered
        type_url: String,
    },
}
