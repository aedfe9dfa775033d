//! Property-based tests for the ciphertext prefix format
//!
//! The prefix is the only thing a reader has to route a ciphertext to its
//! candidate keys, so it must be deterministic, injective over key ids for a
//! given framing, and empty exactly for RAW keys.

use keyroll_proto::{
    KeyData, KeyMaterialType, KeyStatus, KeysetKey, LEGACY_START_BYTE, NON_RAW_PREFIX_SIZE,
    OutputPrefixType, TINK_START_BYTE, ciphertext_prefix, id_requirement, output_prefix,
};
use proptest::prelude::*;

fn arbitrary_prefix_type() -> impl Strategy<Value = OutputPrefixType> {
    prop_oneof![
        Just(OutputPrefixType::Tink),
        Just(OutputPrefixType::Legacy),
        Just(OutputPrefixType::Raw),
        Just(OutputPrefixType::Crunchy),
    ]
}

fn keyset_key(key_id: u32, output_prefix_type: OutputPrefixType) -> KeysetKey {
    KeysetKey::new(
        key_id,
        KeyStatus::Enabled,
        output_prefix_type,
        KeyData::new("type.example/PropKey", vec![0u8; 16], KeyMaterialType::Symmetric),
    )
}

#[test]
fn prop_prefix_encodes_key_id() {
    proptest!(|(key_id in any::<u32>(), prefix_type in arbitrary_prefix_type())| {
        let key = keyset_key(key_id, prefix_type);
        let prefix = output_prefix(&key).expect("known prefix type");

        if prefix_type == OutputPrefixType::Raw {
            prop_assert!(prefix.is_empty());
            prop_assert_eq!(id_requirement(&key), None);
        } else {
            // PROPERTY: non-RAW prefixes are start byte + big-endian key id
            prop_assert_eq!(prefix.len(), NON_RAW_PREFIX_SIZE);
            let expected_start = if prefix_type == OutputPrefixType::Tink {
                TINK_START_BYTE
            } else {
                LEGACY_START_BYTE
            };
            prop_assert_eq!(prefix[0], expected_start);
            let decoded = u32::from_be_bytes([prefix[1], prefix[2], prefix[3], prefix[4]]);
            prop_assert_eq!(decoded, key_id);
            prop_assert_eq!(id_requirement(&key), Some(key_id));
        }
    });
}

#[test]
fn prop_distinct_ids_have_distinct_prefixes() {
    proptest!(|(a in any::<u32>(), b in any::<u32>(), prefix_type in arbitrary_prefix_type())| {
        prop_assume!(a != b);
        prop_assume!(prefix_type != OutputPrefixType::Raw);

        let prefix_a = output_prefix(&keyset_key(a, prefix_type)).expect("known prefix type");
        let prefix_b = output_prefix(&keyset_key(b, prefix_type)).expect("known prefix type");

        prop_assert_ne!(prefix_a, prefix_b);
    });
}

#[test]
fn prop_ciphertext_prefix_recovers_output_prefix() {
    proptest!(|(
        key_id in any::<u32>(),
        body in prop::collection::vec(any::<u8>(), 0..64),
    )| {
        let prefix = output_prefix(&keyset_key(key_id, OutputPrefixType::Tink))
            .expect("known prefix type");
        let mut ciphertext = prefix.clone();
        ciphertext.extend_from_slice(&body);

        prop_assert_eq!(ciphertext_prefix(&ciphertext), Some(prefix.as_slice()));
    });
}

#[test]
fn tink_prefix_hex_rendering() {
    let prefix = output_prefix(&keyset_key(0xDEAD_BEEF, OutputPrefixType::Tink))
        .expect("known prefix type");
    assert_eq!(hex::encode(prefix), "01deadbeef");
}
