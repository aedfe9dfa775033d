//! Keyset key records.
//!
//! These mirror the protobuf keyset schema closely enough that callers can
//! convert their decoded messages field by field. Enum values keep the
//! protobuf numbering so `from_i32`/`to_i32` are lossless for known values;
//! unrecognized numbers collapse to `Unknown`.

use std::fmt;

use zeroize::Zeroize;

/// Lifecycle status of a key inside a keyset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStatus {
    /// Status was not set or not recognized
    Unknown,
    /// Key may be used for new and existing operations
    Enabled,
    /// Key is kept in the keyset but must not be used
    Disabled,
    /// Key material has been destroyed
    Destroyed,
}

impl KeyStatus {
    /// Decode the protobuf enum number.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Enabled,
            2 => Self::Disabled,
            3 => Self::Destroyed,
            _ => Self::Unknown,
        }
    }

    /// Protobuf enum number.
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Enabled => 1,
            Self::Disabled => 2,
            Self::Destroyed => 3,
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN_STATUS",
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
            Self::Destroyed => "DESTROYED",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How ciphertexts produced with a key are prefixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputPrefixType {
    /// Not set or not recognized. Keys of this type cannot be used.
    Unknown,
    /// 5-byte prefix starting with [`crate::TINK_START_BYTE`]
    Tink,
    /// 5-byte prefix starting with [`crate::LEGACY_START_BYTE`]
    Legacy,
    /// No prefix
    Raw,
    /// Same framing as `Legacy`, kept for compatibility with older keysets
    Crunchy,
}

impl OutputPrefixType {
    /// Decode the protobuf enum number.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Tink,
            2 => Self::Legacy,
            3 => Self::Raw,
            4 => Self::Crunchy,
            _ => Self::Unknown,
        }
    }

    /// Protobuf enum number.
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Tink => 1,
            Self::Legacy => 2,
            Self::Raw => 3,
            Self::Crunchy => 4,
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN_PREFIX",
            Self::Tink => "TINK",
            Self::Legacy => "LEGACY",
            Self::Raw => "RAW",
            Self::Crunchy => "CRUNCHY",
        }
    }
}

impl fmt::Display for OutputPrefixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of key material carried in [`KeyData::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyMaterialType {
    /// Not set or not recognized
    Unknown,
    /// Secret symmetric key
    Symmetric,
    /// Private half of an asymmetric key pair
    AsymmetricPrivate,
    /// Public half of an asymmetric key pair
    AsymmetricPublic,
    /// Reference to key material held elsewhere (KMS, HSM)
    Remote,
}

impl KeyMaterialType {
    /// Decode the protobuf enum number.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Symmetric,
            2 => Self::AsymmetricPrivate,
            3 => Self::AsymmetricPublic,
            4 => Self::Remote,
            _ => Self::Unknown,
        }
    }

    /// Protobuf enum number.
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Symmetric => 1,
            Self::AsymmetricPrivate => 2,
            Self::AsymmetricPublic => 3,
            Self::Remote => 4,
        }
    }

    /// True for material that must only be handed out with secret access.
    pub fn is_secret(self) -> bool {
        matches!(self, Self::Symmetric | Self::AsymmetricPrivate | Self::Unknown)
    }
}

/// Serialized key material.
///
/// `value` is opaque to this crate. It is zeroized on drop and never printed
/// by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyData {
    /// Type URL naming the key's serialization format
    pub type_url: String,
    /// Serialized key bytes
    pub value: Vec<u8>,
    /// What kind of material `value` holds
    pub key_material_type: KeyMaterialType,
}

impl KeyData {
    /// Create key data.
    pub fn new(
        type_url: impl Into<String>,
        value: impl Into<Vec<u8>>,
        key_material_type: KeyMaterialType,
    ) -> Self {
        Self { type_url: type_url.into(), value: value.into(), key_material_type }
    }
}

impl fmt::Debug for KeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyData")
            .field("type_url", &self.type_url)
            .field("value", &format_args!("<{} bytes redacted>", self.value.len()))
            .field("key_material_type", &self.key_material_type)
            .finish()
    }
}

impl Drop for KeyData {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// One key of a keyset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysetKey {
    /// Key id, unique within a well-formed keyset but not required to be
    pub key_id: u32,
    /// Lifecycle status
    pub status: KeyStatus,
    /// Ciphertext framing for this key
    pub output_prefix_type: OutputPrefixType,
    /// Serialized key material
    pub key_data: KeyData,
}

impl KeysetKey {
    /// Create a keyset key record.
    pub fn new(
        key_id: u32,
        status: KeyStatus,
        output_prefix_type: OutputPrefixType,
        key_data: KeyData,
    ) -> Self {
        Self { key_id, status, output_prefix_type, key_data }
    }

    /// Whether the key may be used.
    pub fn is_enabled(&self) -> bool {
        self.status == KeyStatus::Enabled
    }
}
