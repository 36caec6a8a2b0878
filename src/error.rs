//! Error types.

use thiserror::Error;

/// Reasons a generator can be refused at construction time.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Error)]
pub enum ConfigurationError {
    /// The requested number of digits was outside of the range [1, 10].
    #[error("digits must be between 1 and 10, got {0}")]
    Digits(u8),
    /// The digest algorithm declares an output shorter than 18 bytes.
    #[error("digest {algorithm} produces {size} bytes, at least 18 are required")]
    DigestSize {
        algorithm: &'static str,
        size: usize,
    },
}

/// OTP error type.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum OtpError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The secret is not valid base32, even after padding.
    #[error("secret is not valid base32: {0}")]
    Decode(#[from] data_encoding::DecodeError),
    /// The counter was negative.
    #[error("counter must be non-negative, got {0}")]
    InvalidInput(i64),
    /// The computed digest was too short to truncate.
    #[error("digest is {size} bytes, at least 18 are required")]
    InvalidDigest { size: usize },
}

pub type Result<T> = std::result::Result<T, OtpError>;
