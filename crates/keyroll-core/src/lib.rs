//! Keyroll: immutable primitive sets for key rotation
//!
//! A keyset holds several keys at once while it rotates: one primary key
//! that produces new ciphertexts and older keys that must still open what
//! they produced. For each key a caller constructs primitive instances
//! (AEADs, MACs, signers) and registers them here, together with the key's
//! record. The resulting [`PrimitiveSet`] answers two questions:
//!
//! - which entry encrypts? → [`PrimitiveSet::primary`]
//! - which entries might decrypt this ciphertext? →
//!   [`PrimitiveSet::primitive`] with the ciphertext's prefix, then
//!   [`PrimitiveSet::raw_primitives`]
//!
//! # Lifecycle
//!
//! ```text
//! Builder::new(parser)
//!        │
//!        ▼ add_primitive / add_primary_primitive / ... (validate, parse, index)
//! Builder (open)
//!        │
//!        ▼ build()
//! PrimitiveSet (immutable, Send + Sync)   +   Builder (sealed)
//! ```
//!
//! # Security
//!
//! - Only `ENABLED` keys enter a set
//! - A set has at most one primary
//! - Identifiers are copied in and copied out; no caller can alter the bytes
//!   the index hashes
//! - Key material is parsed by an injected [`KeyParser`]; there is no global
//!   registry to tamper with

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod annotations;
pub mod builder;
pub mod entry;
pub mod error;
pub mod key;
pub mod prefix;
pub mod primitive_set;
pub mod registry;

pub use annotations::{MonitoringAnnotations, MonitoringAnnotationsBuilder};
pub use builder::Builder;
pub use entry::{Entry, Primitives};
pub use error::{KeyParseError, PrimitiveSetError};
pub use key::{Key, Parameters, ProtoKeySerialization, SecretKeyAccess};
pub use prefix::Prefix;
pub use primitive_set::{EntryList, PrimitiveSet};
pub use registry::{KeyParser, LegacyProtoKey, LegacyProtoParameters, SerializationRegistry};
