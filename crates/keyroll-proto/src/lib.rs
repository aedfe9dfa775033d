//! Keyset key records and the ciphertext prefix format.
//!
//! A keyset is an ordered list of keys. Each key carries an id, a status and
//! an output prefix type which decides how ciphertexts produced with that key
//! are framed on the wire:
//!
//! ```text
//! TINK     0x01 || key_id (u32, BE) || ciphertext
//! LEGACY   0x00 || key_id (u32, BE) || ciphertext
//! CRUNCHY  0x00 || key_id (u32, BE) || ciphertext
//! RAW                                  ciphertext
//! ```
//!
//! The prefix is what a reader uses to pick candidate keys when decrypting.
//! This crate only describes the records and computes prefixes; it performs
//! no cryptography and parses no serialized keysets.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod key;
pub mod prefix;

pub use errors::{ProtocolError, Result};
pub use key::{KeyData, KeyMaterialType, KeyStatus, KeysetKey, OutputPrefixType};
pub use prefix::{
    LEGACY_START_BYTE, NON_RAW_PREFIX_SIZE, RAW_PREFIX, TINK_START_BYTE, ciphertext_prefix,
    id_requirement, output_prefix,
};
