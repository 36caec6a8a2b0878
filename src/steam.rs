//! Steam Guard codes.
//!
//! Steam's authenticator is TOTP with a 30 second period and HMAC-SHA1, but instead of printing
//! the truncated integer in decimal it spells it out in base 26, least significant symbol first,
//! using an alphabet without easily confused characters.

use log::trace;

use crate::error::Result;
use crate::{counter_value, Algorithm, Counter, Otp};

/// Symbols of Steam Guard codes, in value order.
pub const STEAM_CHARS: &str = "23456789BCDFGHJKMNPQRTVWXY";

const STEAM_CODE_LENGTH: usize = 5;
const STEAM_INTERNAL_DIGITS: u8 = 10;
const DEFAULT_INTERVAL: u64 = 30;

/// Steam Guard code generator.
///
/// The inner generator is always ten-digit HMAC-SHA1 so that the whole 31-bit truncated value is
/// available for re-encoding. The `digits` and `interval` settings are carried along for callers
/// (provisioning, time step derivation) and do not change the generated code.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Steam {
    otp: Otp,
    interval: u64,
    digits: u8,
}

/// Builder for [`Steam`].
#[derive(Clone, Debug)]
pub struct SteamBuilder {
    secret: String,
    name: Option<String>,
    issuer: Option<String>,
    interval: u64,
    digits: u8,
}

impl SteamBuilder {
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

    /// Time step in seconds, 30 by default.
    pub fn interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    /// Advertised code length. Codes are always five characters regardless.
    pub fn digits(mut self, digits: u8) -> Self {
        self.digits = digits;
        self
    }

    /// Builds the generator around a ten-digit HMAC-SHA1 [`Otp`].
    ///
    /// # Errors
    ///
    /// The inner configuration is fixed and valid, so this only mirrors [`OtpBuilder::build`].
    ///
    /// [`OtpBuilder::build`]: crate::OtpBuilder::build
    pub fn build(self) -> Result<Steam> {
        let mut otp = Otp::builder(self.secret)
            .digits(STEAM_INTERNAL_DIGITS)
            .algorithm(Algorithm::Sha1);
        if let Some(name) = self.name {
            otp = otp.name(name);
        }
        if let Some(issuer) = self.issuer {
            otp = otp.issuer(issuer);
        }
        Ok(Steam {
            otp: otp.build()?,
            interval: self.interval,
            digits: self.digits,
        })
    }
}

impl Steam {
    /// Steam generator for `secret` with the default 30 second interval.
    pub fn new<S: Into<String>>(secret: S) -> Result<Self> {
        Self::builder(secret).build()
    }

    /// Starts building a generator with a 30 second interval and no issuer.
    pub fn builder<S: Into<String>>(secret: S) -> SteamBuilder {
        SteamBuilder {
            secret: secret.into(),
            name: None,
            issuer: None,
            interval: DEFAULT_INTERVAL,
            digits: STEAM_CODE_LENGTH as u8,
        }
    }

    /// Time step in seconds.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Advertised code length, as configured.
    pub fn digits(&self) -> u8 {
        self.digits
    }

    /// The base32 secret as given.
    pub fn secret(&self) -> &str {
        self.otp.secret()
    }

    /// Account name, `"Secret"` unless one was given.
    pub fn name(&self) -> &str {
        self.otp.name()
    }

    /// Issuer label, if any.
    pub fn issuer(&self) -> Option<&str> {
        self.otp.issuer()
    }

    /// Generates the five-character code for `counter`.
    ///
    /// # Errors
    ///
    /// Same as [`Otp::generate_otp`]: a negative counter or an undecodable secret.
    pub fn generate_otp<C: Counter>(&self, counter: C) -> Result<String> {
        let counter = counter_value(&counter)?;
        let mut code = self.otp.otp_value(counter)?;
        let alphabet = STEAM_CHARS.as_bytes();
        let base = alphabet.len() as u64;
        let mut out = String::with_capacity(STEAM_CODE_LENGTH);
        for _ in 0..STEAM_CODE_LENGTH {
            out.push(char::from(alphabet[(code % base) as usize]));
            code /= base;
        }
        trace!("Generated Steam code for counter {}", counter);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OtpError;
    use quickcheck::quickcheck;
    use spectral::prelude::*;

    const SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn alphabet() {
        assert_that(&STEAM_CHARS.len()).is_equal_to(26);
        for c in "01AEILOSUZ".chars() {
            assert_that(&STEAM_CHARS.contains(c)).is_false();
        }
    }

    #[test]
    fn known_codes() {
        let steam = Steam::new(SECRET).unwrap();
        assert_that(&steam.generate_otp(0u64)).is_equal_to(Ok("GG5F5".to_string()));
        assert_that(&steam.generate_otp(1u64)).is_equal_to(Ok("PV9M4".to_string()));
        assert_that(&steam.generate_otp(2u64)).is_equal_to(Ok("B26KJ".to_string()));
        assert_that(&steam.generate_otp(1_234_567_890u64 / 30)).is_equal_to(Ok("VHHQY".to_string()));

        let steam = Steam::new("JBSWY3DPEHPK3PXP").unwrap();
        assert_that(&steam.generate_otp(0u64)).is_equal_to(Ok("VH8YJ".to_string()));
        assert_that(&steam.generate_otp(41_152_263u64)).is_equal_to(Ok("K8G5W".to_string()));
    }

    #[test]
    fn digits_do_not_change_output() {
        let five = Steam::new(SECRET).unwrap();
        let eight = Steam::builder(SECRET).digits(8).interval(60).build().unwrap();
        assert_that(&eight.digits()).is_equal_to(8);
        assert_that(&eight.interval()).is_equal_to(60);
        assert_that(&eight.generate_otp(7u64)).is_equal_to(five.generate_otp(7u64));
    }

    #[test]
    fn metadata() {
        let steam = Steam::builder(SECRET).name("gaben").issuer("Steam").build().unwrap();
        assert_that(&steam.name()).is_equal_to("gaben");
        assert_that(&steam.issuer()).is_equal_to(Some("Steam"));
        assert_that(&steam.secret()).is_equal_to(SECRET);
        assert_that(&steam.interval()).is_equal_to(30);
        assert_that(&steam.digits()).is_equal_to(5);
        assert_that(&Steam::new(SECRET).unwrap().name()).is_equal_to("Secret");
    }

    #[test]
    fn negative_counter() {
        let steam = Steam::new(SECRET).unwrap();
        assert_that(&steam.generate_otp(-30i64)).is_equal_to(Err(OtpError::InvalidInput(-30)));
    }

    #[test]
    fn bad_secret() {
        let steam = Steam::new("!!!!").unwrap();
        assert_that(&steam.generate_otp(0u64)).matches(|r| matches!(r, Err(OtpError::Decode(_))));
    }

    quickcheck! {
        fn prop_five_symbols(counter: u64) -> bool {
            let steam = Steam::new(SECRET).unwrap();
            let code = steam.generate_otp(counter).unwrap();
            code.len() == 5 && code.chars().all(|c| STEAM_CHARS.contains(c))
        }

        fn prop_deterministic(counter: u64) -> bool {
            let steam = Steam::new("JBSWY3DPEHPK3PXP").unwrap();
            steam.generate_otp(counter) == steam.generate_otp(counter)
        }
    }
}
