//! Fuzz target for ciphertext prefix routing
//!
//! Feeds arbitrary ciphertexts to a fixed primitive set and checks that
//! lookup never panics and only ever returns entries whose identifier
//! matches the bytes it was given.
//!
//! # Invariants
//!
//! - `ciphertext_prefix` returns exactly the first 5 bytes, or nothing
//! - Every entry returned for a prefix carries that prefix
//! - Raw entries are always available as a fallback

#![no_main]

use std::sync::Arc;

use keyroll_core::{PrimitiveSet, SerializationRegistry};
use keyroll_proto::{
    KeyData, KeyMaterialType, KeyStatus, KeysetKey, NON_RAW_PREFIX_SIZE, OutputPrefixType,
    ciphertext_prefix,
};
use libfuzzer_sys::fuzz_target;

fn key(key_id: u32, output_prefix_type: OutputPrefixType) -> KeysetKey {
    KeysetKey::new(
        key_id,
        KeyStatus::Enabled,
        output_prefix_type,
        KeyData::new("type.example/FuzzKey", vec![3u8; 16], KeyMaterialType::Symmetric),
    )
}

fn fixed_set() -> Option<PrimitiveSet<u32>> {
    let mut builder = PrimitiveSet::builder(Arc::new(SerializationRegistry::with_legacy_fallback()));
    builder
        .add_primitive(1, &key(1, OutputPrefixType::Raw))
        .ok()?
        .add_primary_primitive(2, &key(0x0102_0304, OutputPrefixType::Tink))
        .ok()?
        .add_primitive(3, &key(0x0102_0304, OutputPrefixType::Legacy))
        .ok()?
        .add_primitive(4, &key(7, OutputPrefixType::Crunchy))
        .ok()?;
    builder.build().ok()
}

fuzz_target!(|ciphertext: &[u8]| {
    let Some(set) = fixed_set() else {
        return;
    };

    // INVARIANT 1: Prefix extraction is exact
    match ciphertext_prefix(ciphertext) {
        Some(prefix) => {
            assert_eq!(prefix.len(), NON_RAW_PREFIX_SIZE);
            assert_eq!(prefix, &ciphertext[..NON_RAW_PREFIX_SIZE]);

            // INVARIANT 2: Lookup only returns entries with that identifier
            for entry in set.primitive(prefix) {
                assert_eq!(entry.prefix().as_bytes(), prefix);
            }
        },
        None => assert!(ciphertext.len() < NON_RAW_PREFIX_SIZE),
    }

    // Arbitrary-length identifiers must not panic either
    for entry in set.primitive(ciphertext) {
        assert_eq!(entry.identifier(), ciphertext);
    }

    // INVARIANT 3: Raw fallback is independent of the input
    assert_eq!(set.raw_primitives().len(), 1);
});
