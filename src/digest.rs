//! HMAC digest algorithms and dynamic truncation.

use core::fmt;
use core::str::FromStr;

use hmac::{Hmac, Mac};
use md5::Md5;
use ring::hmac::{
    sign, Algorithm as RingAlgorithm, Key as HmacKey, HMAC_SHA1_FOR_LEGACY_USE_ONLY as HMAC_SHA1,
    HMAC_SHA256, HMAC_SHA384, HMAC_SHA512,
};

use crate::error::{OtpError, Result};

/// Smallest digest, in bytes, that generators accept.
pub const MIN_DIGEST_BYTES: usize = 18;

/// Trait enabling use of alternative digest algorithms.
///
/// [RFC 4226][4226] prescribes HMAC-SHA1 as the digest method. However, [RFC 6238][6238] extends
/// HOTP to allow the HMAC-SHA256 and HMAC-SHA512 methods, and other keyed hashes are conceivable.
/// The provided [`Algorithm`] covers the common cases; foreign implementations only need to
/// produce a MAC over a message.
///
/// # Digest size
///
/// Dynamic truncation reads four bytes at an offset of up to 15, so a digest shorter than
/// [`MIN_DIGEST_BYTES`] cannot be used. Implementors that know their output size should report it
/// from [`digest_size`](DigestAlgorithm::digest_size), which lets generators refuse them at
/// construction. Implementors returning `None` are still checked, but only once a digest has
/// actually been computed.
///
/// [4226]: https://datatracker.ietf.org/doc/html/rfc4226
/// [6238]: https://datatracker.ietf.org/doc/html/rfc6238
pub trait DigestAlgorithm {
    /// Human-readable algorithm name, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Output size in bytes, if it is known without computing a digest.
    fn digest_size(&self) -> Option<usize> {
        None
    }

    /// Computes the keyed digest of `message` under `key`.
    fn compute(&self, key: &[u8], message: &[u8]) -> Vec<u8>;
}

impl<D: DigestAlgorithm + ?Sized> DigestAlgorithm for &'_ D {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn digest_size(&self) -> Option<usize> {
        (**self).digest_size()
    }

    fn compute(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        (**self).compute(key, message)
    }
}

/// Built-in HMAC algorithms.
///
/// `Md5` is only here so that configurations naming it are refused with a proper error: its
/// 16-byte digest is too short for truncation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Md5,
}

impl Algorithm {
    fn ring(self) -> Option<RingAlgorithm> {
        match self {
            Algorithm::Sha1 => Some(HMAC_SHA1),
            Algorithm::Sha256 => Some(HMAC_SHA256),
            Algorithm::Sha384 => Some(HMAC_SHA384),
            Algorithm::Sha512 => Some(HMAC_SHA512),
            Algorithm::Md5 => None,
        }
    }
}

impl DigestAlgorithm for Algorithm {
    fn name(&self) -> &'static str {
        match self {
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha384 => "SHA384",
            Algorithm::Sha512 => "SHA512",
            Algorithm::Md5 => "MD5",
        }
    }

    fn digest_size(&self) -> Option<usize> {
        Some(match self {
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
            Algorithm::Md5 => 16,
        })
    }

    fn compute(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self.ring() {
            Some(algorithm) => {
                let key = HmacKey::new(algorithm, key);
                sign(&key, message).as_ref().to_vec()
            }
            // HMAC accepts keys of any length; an empty digest would be rejected downstream anyway.
            None => match <Hmac<Md5> as Mac>::new_from_slice(key) {
                Ok(mut mac) => {
                    mac.update(message);
                    mac.finalize().into_bytes().to_vec()
                }
                Err(_) => Vec::new(),
            },
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown algorithm name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unknown digest algorithm: {}", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA1" => Ok(Algorithm::Sha1),
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA384" => Ok(Algorithm::Sha384),
            "SHA512" => Ok(Algorithm::Sha512),
            "MD5" => Ok(Algorithm::Md5),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// "Dynamic truncation" ([RFC 4226, section 5.3][4226]).
///
/// Returns the 31-bit integer selected by the low nibble of the final digest byte.
///
/// # Errors
///
/// Digests shorter than [`MIN_DIGEST_BYTES`] are refused with [`OtpError::InvalidDigest`].
///
/// [4226]: https://datatracker.ietf.org/doc/html/rfc4226#section-5.3
pub fn truncate(digest: &[u8]) -> Result<u32> {
    let len = digest.len();
    if len < MIN_DIGEST_BYTES {
        return Err(OtpError::InvalidDigest { size: len });
    }
    let offset = (digest[len - 1] & 0xf) as usize;
    // An 18-byte digest whose last nibble is 0xf leaves only three bytes past the offset.
    let window = digest
        .get(offset..offset + 4)
        .ok_or(OtpError::InvalidDigest { size: len })?;
    let bytes = [
        // Strip leading bit to remove signed/unsigned ambiguity
        window[0] & 0x7f,
        window[1],
        window[2],
        window[3],
    ];
    Ok(u32::from_be_bytes(bytes))
}
