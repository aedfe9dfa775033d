//! Ciphertext prefix format.
//!
//! Non-RAW keys prepend 5 bytes to every ciphertext: a start byte selecting
//! the framing and the key id in big-endian order. RAW keys prepend nothing,
//! so all RAW keys of a keyset share the empty prefix.

use crate::{
    KeysetKey, OutputPrefixType,
    errors::{ProtocolError, Result},
};

/// Size of a TINK, LEGACY or CRUNCHY prefix
pub const NON_RAW_PREFIX_SIZE: usize = 5;

/// First byte of a TINK prefix
pub const TINK_START_BYTE: u8 = 0x01;

/// First byte of a LEGACY or CRUNCHY prefix
pub const LEGACY_START_BYTE: u8 = 0x00;

/// Prefix of RAW keys
pub const RAW_PREFIX: &[u8] = &[];

/// Compute the ciphertext prefix for a key.
///
/// # Errors
///
/// - `ProtocolError::UnknownOutputPrefixType` if the key has no usable
///   output prefix type
pub fn output_prefix(key: &KeysetKey) -> Result<Vec<u8>> {
    let start_byte = match key.output_prefix_type {
        OutputPrefixType::Raw => return Ok(RAW_PREFIX.to_vec()),
        OutputPrefixType::Tink => TINK_START_BYTE,
        OutputPrefixType::Legacy | OutputPrefixType::Crunchy => LEGACY_START_BYTE,
        OutputPrefixType::Unknown => {
            return Err(ProtocolError::UnknownOutputPrefixType { key_id: key.key_id });
        },
    };

    let mut prefix = Vec::with_capacity(NON_RAW_PREFIX_SIZE);
    prefix.push(start_byte);
    prefix.extend_from_slice(&key.key_id.to_be_bytes());
    Ok(prefix)
}

/// Key id that ciphertexts of this key are bound to.
///
/// RAW ciphertexts carry no id, so any key of matching parameters may
/// produce them; every other framing binds the key id.
pub fn id_requirement(key: &KeysetKey) -> Option<u32> {
    match key.output_prefix_type {
        OutputPrefixType::Raw => None,
        _ => Some(key.key_id),
    }
}

/// The candidate non-RAW prefix of a ciphertext.
///
/// Returns `None` if the ciphertext is too short to carry one. A returned
/// prefix is only a lookup hint: the ciphertext may equally be RAW.
pub fn ciphertext_prefix(ciphertext: &[u8]) -> Option<&[u8]> {
    ciphertext.get(..NON_RAW_PREFIX_SIZE)
}
