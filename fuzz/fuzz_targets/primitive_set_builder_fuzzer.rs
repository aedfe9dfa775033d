//! Fuzz target for the primitive set builder
//!
//! Drives a builder through arbitrary operation sequences, including calls
//! after `build()`, keys with out-of-range status and prefix numbers, and
//! key material the parser rejects.
//!
//! # Strategy
//!
//! - Raw proto enum values (unknown statuses, unknown prefix types)
//! - Colliding key ids across prefix types
//! - Repeated primary requests
//! - Mutations interleaved with and after `build()`
//!
//! # Invariants
//!
//! - The builder never panics
//! - A rejected call leaves the accumulated entries unchanged
//! - Only ENABLED keys are accepted
//! - At most one primary is accepted, and it is the first
//! - Every call after the first `build()` fails with an illegal-state error
//! - The built set lists every accepted key in order

#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use keyroll_core::{
    Key, KeyParseError, KeyParser, MonitoringAnnotations, Parameters, PrimitiveSet,
    SerializationRegistry,
};
use keyroll_proto::{
    KeyData, KeyMaterialType, KeyStatus, KeysetKey, OutputPrefixType, output_prefix,
};
use libfuzzer_sys::fuzz_target;

const FUZZ_TYPE_URL: &str = "type.example/FuzzKey";

#[derive(Debug, Clone, Arbitrary)]
struct BuilderScenario {
    /// Operations to perform, in order
    operations: Vec<BuilderOperation>,
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzKey {
    key_id: u8,
    status: i8,
    output_prefix_type: i8,
    /// Parser accepts only 16- or 32-byte material
    material: Vec<u8>,
    /// Use a type URL nobody registered
    unregistered: bool,
}

impl FuzzKey {
    fn to_keyset_key(&self) -> KeysetKey {
        let type_url = if self.unregistered { "type.example/Unknown" } else { FUZZ_TYPE_URL };
        KeysetKey::new(
            u32::from(self.key_id),
            KeyStatus::from_i32(i32::from(self.status)),
            OutputPrefixType::from_i32(i32::from(self.output_prefix_type)),
            KeyData::new(type_url, self.material.clone(), KeyMaterialType::Symmetric),
        )
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum BuilderOperation {
    Add { key: FuzzKey, primary: bool },
    AddFull { key: FuzzKey, full: bool, raw: bool, primary: bool },
    Annotate { entries: Vec<(String, String)> },
    Build,
}

#[derive(Debug)]
struct FuzzParameters {
    has_id_requirement: bool,
}

impl Parameters for FuzzParameters {
    fn has_id_requirement(&self) -> bool {
        self.has_id_requirement
    }
}

#[derive(Debug)]
struct ParsedKey {
    parameters: FuzzParameters,
    id_requirement: Option<u32>,
}

impl Key for ParsedKey {
    fn parameters(&self) -> &dyn Parameters {
        &self.parameters
    }

    fn id_requirement(&self) -> Option<u32> {
        self.id_requirement
    }
}

fn parser() -> Option<Arc<dyn KeyParser>> {
    let mut registry = SerializationRegistry::new();
    let parse: Arc<dyn KeyParser> = Arc::new(
        |serialization: &keyroll_core::ProtoKeySerialization,
         access: keyroll_core::SecretKeyAccess|
         -> Result<Arc<dyn Key>, KeyParseError> {
            let len = serialization.value(access).len();
            if len != 16 && len != 32 {
                return Err(KeyParseError::Malformed {
                    type_url: serialization.type_url().to_owned(),
                    reason: format!("unsupported key length {len}"),
                });
            }
            Ok(Arc::new(ParsedKey {
                parameters: FuzzParameters {
                    has_id_requirement: serialization.id_requirement().is_some(),
                },
                id_requirement: serialization.id_requirement(),
            }))
        },
    );
    registry.register_parser(FUZZ_TYPE_URL, parse).ok()?;
    Some(Arc::new(registry))
}

fuzz_target!(|scenario: BuilderScenario| {
    let Some(parser) = parser() else {
        return;
    };
    let mut builder = PrimitiveSet::<usize>::builder(parser);

    // Model of what the builder should have accepted
    let mut accepted: Vec<(usize, Vec<u8>)> = Vec::new();
    let mut primary: Option<usize> = None;
    let mut built: Option<PrimitiveSet<usize>> = None;

    for (position, op) in scenario.operations.into_iter().enumerate() {
        match op {
            BuilderOperation::Add { key, primary: as_primary } => {
                let keyset_key = key.to_keyset_key();
                let result = if as_primary {
                    builder.add_primary_primitive(position, &keyset_key).map(|_| ())
                } else {
                    builder.add_primitive(position, &keyset_key).map(|_| ())
                };
                record(result, &keyset_key, position, as_primary, &built, &mut accepted, &mut primary);
            },

            BuilderOperation::AddFull { key, full, raw, primary: as_primary } => {
                let keyset_key = key.to_keyset_key();
                let full = full.then_some(position);
                let raw = raw.then_some(position);
                let result = if as_primary {
                    builder
                        .add_primary_full_primitive_and_optional_primitive(full, raw, &keyset_key)
                        .map(|_| ())
                } else {
                    builder
                        .add_full_primitive_and_optional_primitive(full, raw, &keyset_key)
                        .map(|_| ())
                };

                // INVARIANT: An entry without any primitive is never accepted
                if full.is_none() && raw.is_none() {
                    assert!(result.is_err(), "entry without primitives accepted");
                }
                record(result, &keyset_key, position, as_primary, &built, &mut accepted, &mut primary);
            },

            BuilderOperation::Annotate { entries } => {
                let annotations = entries
                    .into_iter()
                    .fold(MonitoringAnnotations::builder(), |b, (k, v)| b.add(k, v))
                    .build();
                let result = builder.set_annotations(annotations);
                assert_eq!(result.is_err(), built.is_some(), "annotations after build");
            },

            BuilderOperation::Build => match builder.build() {
                Ok(set) => {
                    assert!(built.is_none(), "build succeeded twice");
                    built = Some(set);
                },
                Err(err) => {
                    assert!(built.is_some(), "first build failed");
                    assert!(err.is_illegal_state());
                },
            },
        }
    }

    let Some(set) = built.or_else(|| builder.build().ok()) else {
        return;
    };

    // INVARIANT: The set lists every accepted key, in order
    let positions: Vec<usize> = set
        .all_in_keyset_order()
        .iter()
        .filter_map(|entry| entry.primitive().or(entry.full_primitive()).copied())
        .collect();
    let expected: Vec<usize> = accepted.iter().map(|(position, _)| *position).collect();
    assert_eq!(positions, expected);

    // INVARIANT: Each entry is indexed under its own identifier
    for (entry, (_, prefix)) in set.all_in_keyset_order().iter().zip(&accepted) {
        assert_eq!(&entry.identifier(), prefix);
        assert!(set.primitive(prefix).iter().any(|candidate| Arc::ptr_eq(candidate, entry)));
    }

    // INVARIANT: The first accepted primary is the set's primary
    let set_primary = set
        .primary()
        .and_then(|entry| entry.primitive().or(entry.full_primitive()).copied());
    assert_eq!(set_primary, primary);
});

fn record(
    result: Result<(), keyroll_core::PrimitiveSetError>,
    key: &KeysetKey,
    position: usize,
    as_primary: bool,
    built: &Option<PrimitiveSet<usize>>,
    accepted: &mut Vec<(usize, Vec<u8>)>,
    primary: &mut Option<usize>,
) {
    match result {
        Ok(()) => {
            assert!(built.is_none(), "mutation accepted after build");
            assert!(key.is_enabled(), "non-enabled key accepted");
            if as_primary {
                assert!(primary.is_none(), "second primary accepted");
                *primary = Some(position);
            }
            let Ok(prefix) = output_prefix(key) else {
                panic!("key with unknown prefix type accepted");
            };
            accepted.push((position, prefix));
        },
        Err(err) => {
            if built.is_some() {
                assert!(err.is_illegal_state(), "sealed builder returned {err}");
            }
        },
    }
}
