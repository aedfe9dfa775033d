//! Content-compared identifier used as the primitive set's index key.

use std::{borrow::Borrow, fmt};

/// Ciphertext prefix of a key, compared and hashed by content.
///
/// The bytes are copied in on construction and never handed out mutably.
/// `Borrow<[u8]>` lets the index be probed with a plain byte slice.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix(Box<[u8]>);

impl Prefix {
    /// Copy `bytes` into a new prefix.
    pub fn new(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }

    /// The empty prefix shared by all RAW keys.
    pub fn raw() -> Self {
        Self(Box::default())
    }

    /// Prefix bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Owned copy of the prefix bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Prefix length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the RAW (empty) prefix.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Borrow<[u8]> for Prefix {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Prefix {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prefix({self})")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn equal_content_is_equal_key() {
        let mut map = HashMap::new();
        map.insert(Prefix::new(&[1, 0, 0, 0, 42]), "tink");

        let probe = vec![1u8, 0, 0, 0, 42];
        assert_eq!(map.get(probe.as_slice()), Some(&"tink"));
        assert_eq!(map.get(&Prefix::from(probe)), Some(&"tink"));
    }

    #[test]
    fn copied_on_construction() {
        let mut source = vec![1u8, 2, 3];
        let prefix = Prefix::new(&source);
        source[0] = 9;

        assert_eq!(prefix.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn raw_prefix_is_empty() {
        assert!(Prefix::raw().is_empty());
        assert_eq!(Prefix::raw(), Prefix::new(&[]));
    }

    #[test]
    fn display_is_hex() {
        insta::assert_snapshot!(Prefix::new(&[0x01, 0xDE, 0xAD, 0xBE, 0xEF]).to_string(), @"01deadbeef");
    }
}
