use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// A one-time code issued by a health operator to authorise an upload.
///
/// Opaque to this crate beyond basic shape checks; the backend decides
/// whether it is valid. Normalised to upper case.
#[derive(Clone)]
pub struct Otp(SecretString);

/// Rejected OTP input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid OTP: {0}")]
pub struct InvalidOtp(&'static str);

impl Otp {
    pub fn new(raw: &str) -> Result<Self, InvalidOtp> {
        let code = raw.trim();
        if code.is_empty() {
            return Err(InvalidOtp("empty"));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidOtp("only letters and digits are allowed"));
        }
        Ok(Self(SecretString::from(code.to_ascii_uppercase())))
    }

    /// Value of the `Authorization: Bearer` token: hex SHA-256 of the code.
    pub fn bearer_token(&self) -> String {
        hex::encode(Sha256::digest(self.0.expose_secret().as_bytes()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl FromStr for Otp {
    type Err = InvalidOtp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Otp([REDACTED])")
    }
}

impl PartialEq for Otp {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Otp {}
