// Body padding for traffic-analysis resistance.
//
// OTP-authorised bodies carry a `padding` string so every request of the
// same kind leaves the device with the same encoded size.

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;

use crate::error::Error;

/// Encoded size every padded OTP validation and upload body is grown to.
pub const PADDED_BODY_LEN: usize = 110_000;

/// Bytes still missing for `value` to encode to `target_len`.
///
/// `value` must be serialized with an empty padding field.
pub(crate) fn missing_len<T: Serialize>(value: &T, target_len: usize) -> Result<usize, Error> {
    let encoded = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(target_len.saturating_sub(encoded.len()))
}

/// Random alphanumeric filler. ASCII alphanumerics need no JSON escaping,
/// so `len` characters always encode to exactly `len` bytes.
pub(crate) fn filler<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}
