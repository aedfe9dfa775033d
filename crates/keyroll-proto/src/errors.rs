//! Error types for keyset records and prefix computation.

use thiserror::Error;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while interpreting keyset key records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The key's output prefix type is not one we know how to frame
    #[error("key {key_id}: unknown output prefix type")]
    UnknownOutputPrefixType {
        /// Id of the offending key
        key_id: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::UnknownOutputPrefixType { key_id: 42 };
        insta::assert_snapshot!(err.to_string(), @"key 42: unknown output prefix type");
    }
}
