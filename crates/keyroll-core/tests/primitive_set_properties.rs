//! Property-based tests for primitive set construction
//!
//! Generates arbitrary keysets (mixed statuses, prefix types, colliding ids)
//! and an arbitrary choice of primary requests, feeds them through the
//! builder the way a primitive wrapper would, and checks the built set
//! against a straightforward model.

use std::sync::Arc;

use keyroll_core::{KeyParser, PrimitiveSet, PrimitiveSetError, SerializationRegistry};
use keyroll_proto::{
    KeyData, KeyMaterialType, KeyStatus, KeysetKey, OutputPrefixType, output_prefix,
};
use proptest::prelude::*;

fn arbitrary_status() -> impl Strategy<Value = KeyStatus> {
    prop_oneof![
        6 => Just(KeyStatus::Enabled),
        1 => Just(KeyStatus::Disabled),
        1 => Just(KeyStatus::Destroyed),
        1 => Just(KeyStatus::Unknown),
    ]
}

fn arbitrary_prefix_type() -> impl Strategy<Value = OutputPrefixType> {
    prop_oneof![
        Just(OutputPrefixType::Tink),
        Just(OutputPrefixType::Legacy),
        Just(OutputPrefixType::Raw),
        Just(OutputPrefixType::Crunchy),
    ]
}

/// Small id space so collisions are common.
fn arbitrary_key() -> impl Strategy<Value = (KeysetKey, bool)> {
    (0u32..8, arbitrary_status(), arbitrary_prefix_type(), any::<bool>()).prop_map(
        |(key_id, status, output_prefix_type, as_primary)| {
            let key = KeysetKey::new(
                key_id,
                status,
                output_prefix_type,
                KeyData::new("type.example/PropKey", vec![7u8; 16], KeyMaterialType::Symmetric),
            );
            (key, as_primary)
        },
    )
}

fn parser() -> Arc<dyn KeyParser> {
    Arc::new(SerializationRegistry::with_legacy_fallback())
}

#[test]
fn prop_built_set_matches_model() {
    proptest!(|(keys in prop::collection::vec(arbitrary_key(), 0..24))| {
        let mut builder = PrimitiveSet::builder(parser());

        // Model: (position tag, key) of every accepted addition
        let mut accepted: Vec<(usize, KeysetKey)> = Vec::new();
        let mut primary: Option<usize> = None;

        for (position, (key, as_primary)) in keys.iter().enumerate() {
            let result = if *as_primary {
                builder.add_primary_primitive(position, key)
            } else {
                builder.add_primitive(position, key)
            };

            match result {
                Ok(_) => {
                    prop_assert!(key.is_enabled());
                    if *as_primary {
                        prop_assert!(primary.is_none());
                        primary = Some(position);
                    }
                    accepted.push((position, key.clone()));
                },
                Err(PrimitiveSetError::KeyNotEnabled { key_id, .. }) => {
                    prop_assert!(!key.is_enabled());
                    prop_assert_eq!(key_id, key.key_id);
                },
                Err(PrimitiveSetError::DuplicatePrimary { .. }) => {
                    prop_assert!(*as_primary);
                    prop_assert!(primary.is_some());
                },
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        let set = builder.build().expect("first build succeeds");

        // PROPERTY: Keyset order is exactly the accepted additions, in order
        let ordered: Vec<usize> = set
            .all_in_keyset_order()
            .iter()
            .filter_map(|entry| entry.primitive().copied())
            .collect();
        let expected: Vec<usize> = accepted.iter().map(|(position, _)| *position).collect();
        prop_assert_eq!(ordered, expected);

        // PROPERTY: Each lookup returns exactly the entries with that prefix, in order
        for (_, key) in &accepted {
            let prefix = output_prefix(key).expect("known prefix type");
            let found: Vec<usize> = set
                .primitive(&prefix)
                .iter()
                .filter_map(|entry| entry.primitive().copied())
                .collect();
            let expected: Vec<usize> = accepted
                .iter()
                .filter(|(_, other)| output_prefix(other).expect("known prefix type") == prefix)
                .map(|(position, _)| *position)
                .collect();
            prop_assert_eq!(found, expected);
        }

        // PROPERTY: Groups partition the set
        let grouped: usize = set.all().map(<[_]>::len).sum();
        prop_assert_eq!(grouped, set.len());

        // PROPERTY: The first accepted primary request wins
        prop_assert_eq!(set.primary().and_then(|entry| entry.primitive().copied()), primary);
    });
}

#[test]
fn prop_sealed_builder_rejects_everything() {
    proptest!(|(keys in prop::collection::vec(arbitrary_key(), 1..8))| {
        let mut builder = PrimitiveSet::builder(parser());
        let set = builder.build().expect("first build succeeds");

        for (position, (key, as_primary)) in keys.iter().enumerate() {
            let result = if *as_primary {
                builder.add_primary_primitive(position, key).map(|_| ())
            } else {
                builder.add_primitive(position, key).map(|_| ())
            };
            let err = result.expect_err("sealed builder must reject");
            prop_assert!(err.is_illegal_state());
        }

        prop_assert!(builder.build().is_err());
        prop_assert!(set.is_empty());
    });
}
