//! Key parsing: the injected parser interface and an in-memory registry.
//!
//! The builder never reaches for process-wide state. It is given an
//! `Arc<dyn KeyParser>` and calls it once per added key. Closures implement
//! [`KeyParser`], which keeps test doubles to a single line.
//!
//! [`SerializationRegistry`] is the stock implementation: parsers keyed by
//! type URL, optionally falling back to [`LegacyProtoKey`] for types nobody
//! registered a parser for.

use std::{collections::HashMap, fmt, sync::Arc};

use keyroll_proto::OutputPrefixType;

use crate::{
    error::KeyParseError,
    key::{Key, Parameters, ProtoKeySerialization, SecretKeyAccess},
};

/// Turns serialized key material into a parsed [`Key`].
pub trait KeyParser: Send + Sync {
    /// Parse one key.
    ///
    /// # Errors
    ///
    /// - `KeyParseError::UnknownTypeUrl` if nothing can parse this type
    /// - `KeyParseError::Malformed` if the bytes are not a valid key
    fn parse_key(
        &self,
        serialization: &ProtoKeySerialization,
        access: SecretKeyAccess,
    ) -> Result<Arc<dyn Key>, KeyParseError>;
}

impl<F> KeyParser for F
where
    F: Fn(&ProtoKeySerialization, SecretKeyAccess) -> Result<Arc<dyn Key>, KeyParseError>
        + Send
        + Sync,
{
    fn parse_key(
        &self,
        serialization: &ProtoKeySerialization,
        access: SecretKeyAccess,
    ) -> Result<Arc<dyn Key>, KeyParseError> {
        self(serialization, access)
    }
}

/// In-memory parser registry keyed by type URL.
///
/// Populate it once at startup, then share it behind an `Arc`. Parsing takes
/// `&self` and never locks.
#[derive(Default)]
pub struct SerializationRegistry {
    parsers: HashMap<String, Arc<dyn KeyParser>>,
    legacy_fallback: bool,
}

impl SerializationRegistry {
    /// Empty registry that rejects unknown type URLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry that wraps unknown type URLs in [`LegacyProtoKey`].
    pub fn with_legacy_fallback() -> Self {
        Self { parsers: HashMap::new(), legacy_fallback: true }
    }

    /// Register `parser` for `type_url`.
    ///
    /// Registering the same parser twice is a no-op.
    ///
    /// # Errors
    ///
    /// - `KeyParseError::DuplicateParser` if a different parser already owns
    ///   the type URL
    pub fn register_parser(
        &mut self,
        type_url: impl Into<String>,
        parser: Arc<dyn KeyParser>,
    ) -> Result<(), KeyParseError> {
        let type_url = type_url.into();
        if let Some(existing) = self.parsers.get(&type_url) {
            if Arc::ptr_eq(existing, &parser) {
                return Ok(());
            }
            return Err(KeyParseError::DuplicateParser { type_url });
        }

        self.parsers.insert(type_url, parser);
        Ok(())
    }

    /// Check if a parser is registered for `type_url`.
    pub fn has_parser(&self, type_url: &str) -> bool {
        self.parsers.contains_key(type_url)
    }

    /// Whether unknown type URLs fall back to [`LegacyProtoKey`].
    pub fn legacy_fallback(&self) -> bool {
        self.legacy_fallback
    }
}

impl KeyParser for SerializationRegistry {
    fn parse_key(
        &self,
        serialization: &ProtoKeySerialization,
        access: SecretKeyAccess,
    ) -> Result<Arc<dyn Key>, KeyParseError> {
        if let Some(parser) = self.parsers.get(serialization.type_url()) {
            return parser.parse_key(serialization, access);
        }

        if !self.legacy_fallback {
            return Err(KeyParseError::UnknownTypeUrl {
                type_url: serialization.type_url().to_string(),
            });
        }

        tracing::debug!(
            type_url = serialization.type_url(),
            "no key parser registered, using legacy key"
        );
        let key = LegacyProtoKey::new(serialization.clone(), Some(access))?;
        Ok(Arc::new(key))
    }
}

impl fmt::Debug for SerializationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut type_urls: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        type_urls.sort_unstable();
        f.debug_struct("SerializationRegistry")
            .field("type_urls", &type_urls)
            .field("legacy_fallback", &self.legacy_fallback)
            .finish()
    }
}

/// Parameters of a [`LegacyProtoKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyProtoParameters {
    type_url: String,
    output_prefix_type: OutputPrefixType,
}

impl LegacyProtoParameters {
    /// Type URL of the key.
    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    /// Output prefix type of the key.
    pub fn output_prefix_type(&self) -> OutputPrefixType {
        self.output_prefix_type
    }
}

impl Parameters for LegacyProtoParameters {
    fn has_id_requirement(&self) -> bool {
        self.output_prefix_type != OutputPrefixType::Raw
    }
}

/// Key whose type has no registered parser.
///
/// Carries the serialization unchanged so primitive factories that still
/// work on serialized keys can use it.
#[derive(Debug, Clone)]
pub struct LegacyProtoKey {
    serialization: ProtoKeySerialization,
    parameters: LegacyProtoParameters,
}

impl LegacyProtoKey {
    /// Wrap a serialization.
    ///
    /// # Errors
    ///
    /// - `KeyParseError::SecretAccessRequired` if the material is secret and
    ///   no access token was given
    pub fn new(
        serialization: ProtoKeySerialization,
        access: Option<SecretKeyAccess>,
    ) -> Result<Self, KeyParseError> {
        check_access(&serialization, access)?;
        let parameters = LegacyProtoParameters {
            type_url: serialization.type_url().to_string(),
            output_prefix_type: serialization.output_prefix_type(),
        };
        Ok(Self { serialization, parameters })
    }

    /// The wrapped serialization.
    ///
    /// # Errors
    ///
    /// - `KeyParseError::SecretAccessRequired` if the material is secret and
    ///   no access token was given
    pub fn serialization(
        &self,
        access: Option<SecretKeyAccess>,
    ) -> Result<&ProtoKeySerialization, KeyParseError> {
        check_access(&self.serialization, access)?;
        Ok(&self.serialization)
    }
}

impl Key for LegacyProtoKey {
    fn parameters(&self) -> &dyn Parameters {
        &self.parameters
    }

    fn id_requirement(&self) -> Option<u32> {
        self.serialization.id_requirement()
    }
}

fn check_access(
    serialization: &ProtoKeySerialization,
    access: Option<SecretKeyAccess>,
) -> Result<(), KeyParseError> {
    if serialization.key_material_type().is_secret() && access.is_none() {
        return Err(KeyParseError::SecretAccessRequired {
            type_url: serialization.type_url().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use keyroll_proto::KeyMaterialType;

    use super::*;

    fn serialization(type_url: &str, material: KeyMaterialType) -> ProtoKeySerialization {
        ProtoKeySerialization::create(type_url, &[1, 2, 3], material, OutputPrefixType::Tink, Some(9))
            .unwrap()
    }

    #[derive(Debug)]
    struct FixedParameters;

    impl Parameters for FixedParameters {
        fn has_id_requirement(&self) -> bool {
            true
        }
    }

    #[derive(Debug)]
    struct FixedKey(Option<u32>);

    impl Key for FixedKey {
        fn parameters(&self) -> &dyn Parameters {
            &FixedParameters
        }

        fn id_requirement(&self) -> Option<u32> {
            self.0
        }
    }

    fn fixed_parser() -> Arc<dyn KeyParser> {
        Arc::new(
            |s: &ProtoKeySerialization, _: SecretKeyAccess| -> Result<Arc<dyn Key>, KeyParseError> {
                Ok(Arc::new(FixedKey(s.id_requirement())))
            },
        )
    }

    #[test]
    fn strict_registry_rejects_unknown_type() {
        let registry = SerializationRegistry::new();
        let result = registry.parse_key(
            &serialization("type.example/Missing", KeyMaterialType::Symmetric),
            SecretKeyAccess::insecure(),
        );
        assert_eq!(
            result.map(|_| ()),
            Err(KeyParseError::UnknownTypeUrl { type_url: "type.example/Missing".to_string() })
        );
    }

    #[test]
    fn registered_parser_is_used() {
        let mut registry = SerializationRegistry::new();
        registry.register_parser("type.example/Fixed", fixed_parser()).unwrap();

        let key = registry
            .parse_key(
                &serialization("type.example/Fixed", KeyMaterialType::Symmetric),
                SecretKeyAccess::insecure(),
            )
            .unwrap();

        assert_eq!(key.id_requirement(), Some(9));
        let any: &dyn std::any::Any = &*key;
        assert!(any.downcast_ref::<FixedKey>().is_some());
    }

    #[test]
    fn reregistering_same_parser_is_noop() {
        let parser = fixed_parser();
        let mut registry = SerializationRegistry::new();
        registry.register_parser("type.example/Fixed", Arc::clone(&parser)).unwrap();
        registry.register_parser("type.example/Fixed", parser).unwrap();
        assert!(registry.has_parser("type.example/Fixed"));
    }

    #[test]
    fn different_parser_for_same_type_is_rejected() {
        let mut registry = SerializationRegistry::new();
        registry.register_parser("type.example/Fixed", fixed_parser()).unwrap();

        let result = registry.register_parser("type.example/Fixed", fixed_parser());
        assert_eq!(
            result,
            Err(KeyParseError::DuplicateParser { type_url: "type.example/Fixed".to_string() })
        );
    }

    #[test]
    fn legacy_fallback_wraps_unknown_type() {
        let registry = SerializationRegistry::with_legacy_fallback();
        let key = registry
            .parse_key(
                &serialization("type.example/Unregistered", KeyMaterialType::Symmetric),
                SecretKeyAccess::insecure(),
            )
            .unwrap();

        let any: &dyn std::any::Any = &*key;
        let legacy = any.downcast_ref::<LegacyProtoKey>().unwrap();
        assert_eq!(legacy.id_requirement(), Some(9));
        assert!(legacy.parameters().has_id_requirement());
        let inner = legacy.serialization(Some(SecretKeyAccess::insecure())).unwrap();
        assert_eq!(inner.type_url(), "type.example/Unregistered");
    }

    #[test]
    fn legacy_key_guards_secret_material() {
        let secret = serialization("type.example/Secret", KeyMaterialType::Symmetric);
        assert!(matches!(
            LegacyProtoKey::new(secret, None),
            Err(KeyParseError::SecretAccessRequired { .. })
        ));

        let public = serialization("type.example/Public", KeyMaterialType::AsymmetricPublic);
        let key = LegacyProtoKey::new(public, None).unwrap();
        assert!(key.serialization(None).is_ok());
    }
}
