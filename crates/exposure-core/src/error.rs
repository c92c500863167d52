// ── Error taxonomy ──
//
// Every failure a `NetworkManager` operation can report. Callers never see
// reqwest errors, HTTP statuses, or decoding failures directly: the
// `From<exposure_api::Error>` impl below folds each of them into exactly one
// `ErrorCode`.

use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

/// Semantic failure reason with a stable numeric identity.
///
/// The numbers match the `error_code` values the backend puts in its error
/// payloads, plus `1` for failures where no response arrived at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, EnumIter)]
pub enum ErrorCode {
    // ── Client side ──────────────────────────────────────────────────
    /// No response reached the client (DNS, refused connection, TLS, timeout).
    #[error("Cannot connect to the backend")]
    ConnectionError,

    // ── Generic backend failures ─────────────────────────────────────
    #[error("Unexpected backend failure")]
    UnknownError,

    #[error("Request rejected as malformed")]
    BadRequest,

    #[error("Request body does not match the endpoint schema")]
    BodyNotCompliant,

    // ── Upload ───────────────────────────────────────────────────────
    #[error("Too many keys in a single upload")]
    TooManyKeysUploaded,

    #[error("OTP is not authorized")]
    UnauthorizedOtp,

    // ── Key distribution ─────────────────────────────────────────────
    #[error("Requested key batch does not exist")]
    BatchNotFound,

    #[error("No key batches are published")]
    NoBatchesFound,

    // ── OTP ──────────────────────────────────────────────────────────
    #[error("OTP has already been authorized")]
    OtpAlreadyAuthorized,
}

/// A numeric code outside the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown error code: {0}")]
pub struct UnknownErrorCode(pub u16);

impl ErrorCode {
    /// Stable numeric identity, suitable for log correlation.
    pub const fn code(self) -> u16 {
        match self {
            Self::ConnectionError => 1,
            Self::UnknownError => 1000,
            Self::BadRequest => 1001,
            Self::BodyNotCompliant => 1002,
            Self::TooManyKeysUploaded => 1101,
            Self::UnauthorizedOtp => 1102,
            Self::BatchNotFound => 1301,
            Self::NoBatchesFound => 1302,
            Self::OtpAlreadyAuthorized => 1400,
        }
    }

    /// Map a backend-supplied code onto the taxonomy. Anything unrecognised
    /// becomes `UnknownError`.
    pub fn from_code(code: i64) -> Self {
        u16::try_from(code)
            .ok()
            .and_then(|c| Self::try_from(c).ok())
            .unwrap_or(Self::UnknownError)
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::iter()
            .find(|c| c.code() == code)
            .ok_or(UnknownErrorCode(code))
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<exposure_api::Error> for ErrorCode {
    fn from(err: exposure_api::Error) -> Self {
        if err.is_connection() {
            return Self::ConnectionError;
        }
        err.backend_code().map_or(Self::UnknownError, Self::from_code)
    }
}
