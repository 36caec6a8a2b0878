//! HMAC-based one-time passwords.
//!
//! This crate implements the HOTP algorithm of [RFC 4226][4226]: a base32 shared secret and an
//! eight-byte moving counter are fed through an HMAC, the digest is dynamically truncated, and the
//! result is reduced to a zero-padded decimal code. TOTP ([RFC 6238][6238]) is the same
//! computation with a time-derived counter, which callers supply themselves.
//!
//! [`Steam`] wraps the base generator and re-encodes the code into the five-character alphabet
//! used by Steam Guard.
//!
//! ```rust
//! use oath_otp::{Algorithm, Otp};
//!
//! let otp = Otp::builder("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ")
//!     .digits(8)
//!     .algorithm(Algorithm::Sha1)
//!     .build()?;
//! assert_eq!(otp.generate_otp(0u64)?, "84755224");
//!# Ok::<(), oath_otp::OtpError>(())
//! ```
//!
//! [4226]: https://datatracker.ietf.org/doc/html/rfc4226
//! [6238]: https://datatracker.ietf.org/doc/html/rfc6238

use log::{debug, trace};

pub mod digest;
mod error;
pub mod secret;
mod steam;

pub use crate::digest::{Algorithm, DigestAlgorithm};
pub use crate::error::{ConfigurationError, OtpError, Result};
pub use crate::steam::{Steam, SteamBuilder, STEAM_CHARS};

const MIN_DIGITS: u8 = 1;
const MAX_DIGITS: u8 = 10;
const DEFAULT_DIGITS: u8 = 6;
const DEFAULT_NAME: &str = "Secret";

/// Synchronized moving counter.
///
/// [RFC 4226][4226] describes an "8-byte synchronized moving counter." To allow for more
/// sophisticated forms of counters (including in custom structs, etc.), the `Counter` and
/// [`CounterBytes`] traits are exposed.
///
/// `Counter` is implemented for the primitive integer types. Signed integers are accepted for
/// convenience, but negative values are refused with [`OtpError::InvalidInput`].
///
/// [4226]: https://tools.ietf.org/html/rfc4226
pub trait Counter {
    /// The counter value as an eight-byte, big-endian, unsigned integer.
    fn value(&self) -> Result<u64>;
}

/// Raw synchronized moving counter.
///
/// The byte array is simply concatenated (big-endian) to form a `u64`, which is used as the
/// counter value.
pub trait CounterBytes {
    /// The counter value as an array of bytes.
    fn value(&self) -> [u8; 8];
}

impl CounterBytes for [u8; 8] {
    fn value(&self) -> [u8; 8] {
        *self
    }
}

impl<T: CounterBytes> Counter for T {
    fn value(&self) -> Result<u64> {
        Ok(u64::from_be_bytes(CounterBytes::value(self)))
    }
}

macro_rules! impl_counter_unsigned {
    ($($t:ty),+) => ($(
        impl Counter for $t {
            fn value(&self) -> Result<u64> {
                Ok(*self as u64)
            }
        }
    )+)
}
impl_counter_unsigned!(u8, u16, u32, u64, usize);

macro_rules! impl_counter_signed {
    ($($t:ty),+) => ($(
        impl Counter for $t {
            fn value(&self) -> Result<u64> {
                u64::try_from(*self).map_err(|_| OtpError::InvalidInput(*self as i64))
            }
        }
    )+)
}
impl_counter_signed!(i8, i16, i32, i64, isize);

/// Encodes a counter as the OATH byte string: eight bytes, big-endian, zero-padded on the left.
pub const fn int_to_bytestring(counter: u64) -> [u8; 8] {
    counter.to_be_bytes()
}

/// Base OTP generator.
///
/// A generator is immutable once built; [`generate_otp`](Otp::generate_otp) is a pure function of
/// its configuration and the counter, so a single instance can be shared between threads.
///
/// The secret is kept in its base32 form and decoded on every call, which means a malformed secret
/// is reported by `generate_otp` rather than at construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Otp<D = Algorithm> {
    secret: String,
    digits: u8,
    digest: D,
    name: String,
    issuer: Option<String>,
}

/// Builder for [`Otp`].
#[derive(Clone, Debug)]
pub struct OtpBuilder<D = Algorithm> {
    secret: String,
    digits: u8,
    digest: D,
    name: Option<String>,
    issuer: Option<String>,
}

impl Otp {
    /// Six-digit HMAC-SHA1 generator for `secret`.
    ///
    /// # Errors
    ///
    /// Never fails for the default configuration; the `Result` mirrors [`OtpBuilder::build`].
    pub fn new<S: Into<String>>(secret: S) -> Result<Self> {
        Self::builder(secret).build()
    }

    /// Starts building a generator with six digits, HMAC-SHA1 and no issuer.
    pub fn builder<S: Into<String>>(secret: S) -> OtpBuilder {
        OtpBuilder {
            secret: secret.into(),
            digits: DEFAULT_DIGITS,
            digest: Algorithm::default(),
            name: None,
            issuer: None,
        }
    }
}

impl<D: DigestAlgorithm> OtpBuilder<D> {
    /// Number of decimal digits in generated codes, at most 10.
    pub fn digits(mut self, digits: u8) -> Self {
        self.digits = digits;
        self
    }

    /// Replaces the digest algorithm.
    pub fn algorithm<E: DigestAlgorithm>(self, digest: E) -> OtpBuilder<E> {
        OtpBuilder {
            secret: self.secret,
            digits: self.digits,
            digest,
            name: self.name,
            issuer: self.issuer,
        }
    }

    /// Account name, for display only.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Issuer label, for display only.
    pub fn issuer<S: Into<String>>(mut self, issuer: S) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Digits`] if the digit count is outside `1..=10`, and
    /// [`ConfigurationError::DigestSize`] if the algorithm declares a digest shorter than
    /// [`digest::MIN_DIGEST_BYTES`]. Algorithms that do not declare a size are checked on each
    /// call to [`Otp::generate_otp`] instead.
    pub fn build(self) -> Result<Otp<D>> {
        if !(MIN_DIGITS..=MAX_DIGITS).contains(&self.digits) {
            debug!("Refusing OTP generator with {} digits", self.digits);
            return Err(ConfigurationError::Digits(self.digits).into());
        }
        if let Some(size) = self.digest.digest_size() {
            if size < digest::MIN_DIGEST_BYTES {
                debug!(
                    "Refusing OTP generator using {} ({} byte digest)",
                    self.digest.name(),
                    size
                );
                return Err(ConfigurationError::DigestSize {
                    algorithm: self.digest.name(),
                    size,
                }
                .into());
            }
        }
        debug!(
            "Created {}-digit OTP generator using {}",
            self.digits,
            self.digest.name()
        );
        Ok(Otp {
            secret: self.secret,
            digits: self.digits,
            digest: self.digest,
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            issuer: self.issuer,
        })
    }
}

impl<D: DigestAlgorithm> Otp<D> {
    /// The base32 secret as given.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Number of decimal digits in generated codes.
    pub fn digits(&self) -> u8 {
        self.digits
    }

    /// The digest algorithm fed to the HMAC.
    pub fn algorithm(&self) -> &D {
        &self.digest
    }

    /// Account name, `"Secret"` unless one was given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Issuer label, if any.
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Decodes the secret into raw key bytes. See [`secret::byte_secret`].
    pub fn byte_secret(&self) -> Result<Vec<u8>> {
        secret::byte_secret(&self.secret)
    }

    /// Computes the "raw" HOTP value: the truncated 31-bit integer, before decimal reduction.
    ///
    /// # Errors
    ///
    /// Fails on a negative counter (before any hashing), an undecodable secret, or a digest
    /// shorter than [`digest::MIN_DIGEST_BYTES`].
    pub fn raw_otp<C: Counter>(&self, counter: C) -> Result<u32> {
        let counter = counter_value(&counter)?;
        let key = self.byte_secret().map_err(|err| {
            debug!("Cannot decode OTP secret: {}", err);
            err
        })?;
        let mac = self.digest.compute(&key, &int_to_bytestring(counter));
        digest::truncate(&mac).map_err(|err| {
            debug!("Refusing to truncate {} digest: {}", self.digest.name(), err);
            err
        })
    }

    /// Computes the HOTP code for `counter` reduced modulo `10^digits`.
    pub(crate) fn otp_value(&self, counter: u64) -> Result<u64> {
        let raw = self.raw_otp(counter)?;
        Ok(u64::from(raw) % 10_u64.pow(u32::from(self.digits)))
    }

    /// Generates the zero-padded decimal code for `counter`.
    ///
    /// The counter is either an event counter (HOTP) or a time step (TOTP); in both cases the
    /// output is exactly [`digits`](Otp::digits) characters long.
    ///
    /// # Errors
    ///
    /// See [`raw_otp`](Otp::raw_otp).
    pub fn generate_otp<C: Counter>(&self, counter: C) -> Result<String> {
        let counter = counter_value(&counter)?;
        let code = self.otp_value(counter)?;
        // 10^10 exceeds every reduced code, so the rendering always has leading zeros to slice.
        let padded = (10_000_000_000_u64 + code).to_string();
        trace!("Generated {}-digit OTP for counter {}", self.digits, counter);
        Ok(padded[padded.len() - usize::from(self.digits)..].to_string())
    }
}

/// Resolves a counter, logging refusals.
pub(crate) fn counter_value<C: Counter>(counter: &C) -> Result<u64> {
    Counter::value(counter).map_err(|err| {
        debug!("Refusing OTP counter: {}", err);
        err
    })
}
