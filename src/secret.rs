//! Base32 shared secrets.

use std::sync::OnceLock;

use data_encoding::{Encoding, BASE32};

use crate::error::Result;

/// Padded RFC 4648 base32 that also accepts lowercase letters and ignores non-zero trailing bits.
fn base32() -> &'static Encoding {
    static ENCODING: OnceLock<Encoding> = OnceLock::new();
    ENCODING.get_or_init(|| {
        let mut spec = BASE32.specification();
        spec.check_trailing_bits = false;
        spec.translate.from.push_str("abcdefghijklmnopqrstuvwxyz");
        spec.translate.to.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        spec.encoding().unwrap()
    })
}

/// Decodes a base32 secret into raw key bytes.
///
/// Secrets are frequently distributed without their trailing `=` padding, so the input is padded
/// to a multiple of eight characters before decoding. Lowercase letters are accepted.
///
/// # Errors
///
/// Returns [`OtpError::Decode`](crate::OtpError::Decode) if the padded text is not valid base32.
pub fn byte_secret(secret: &str) -> Result<Vec<u8>> {
    let missing = secret.len() % 8;
    let mut padded = String::with_capacity(secret.len() + 8);
    padded.push_str(secret);
    if missing != 0 {
        padded.extend(core::iter::repeat('=').take(8 - missing));
    }
    Ok(base32().decode(padded.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OtpError;
    use spectral::prelude::*;

    #[test]
    fn decodes_padded_and_unpadded() {
        let expected = b"12345678901234567890".to_vec();
        assert_that(&byte_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ")).is_equal_to(Ok(expected));
        assert_that(&byte_secret("JBSWY3DPEE")).is_equal_to(Ok(b"Hello!".to_vec()));
        assert_that(&byte_secret("JBSWY3DPEE======")).is_equal_to(Ok(b"Hello!".to_vec()));
    }

    #[test]
    fn case_insensitive() {
        assert_that(&byte_secret("jbswy3dp")).is_equal_to(byte_secret("JBSWY3DP"));
        assert_that(&byte_secret("JbSwY3dPeHpK3pXp")).is_equal_to(byte_secret("JBSWY3DPEHPK3PXP"));
    }

    #[test]
    fn empty_secret() {
        assert_that(&byte_secret("")).is_equal_to(Ok(Vec::new()));
    }

    #[test]
    fn invalid_secrets() {
        assert_that(&byte_secret("JBSW1Y3D")).matches(|r| matches!(r, Err(OtpError::Decode(_))));
        assert_that(&byte_secret("jbsw y3dp")).matches(|r| matches!(r, Err(OtpError::Decode(_))));
        // Nine characters pad to sixteen, which leaves a dangling symbol.
        assert_that(&byte_secret("JBSWY3DPE")).matches(|r| matches!(r, Err(OtpError::Decode(_))));
    }
}
