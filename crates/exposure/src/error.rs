//! CLI error types with miette diagnostics.
//!
//! Maps `ErrorCode` values into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use exposure_config::ConfigError;
use exposure_core::ErrorCode;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const OTP: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend")]
    #[diagnostic(
        code(exposure::connection_failed),
        help(
            "Check network connectivity and the configured base URLs.\n\
             Override them with --settings-url, --keys-url, --upload-url or --analytics-url,\n\
             or raise the timeout with --timeout."
        )
    )]
    ConnectionFailed,

    #[error("Could not build the HTTP client: {message}")]
    #[diagnostic(
        code(exposure::client),
        help("Check ca_cert in your config file points at a readable PEM certificate.")
    )]
    Client { message: String },

    // ── OTP ──────────────────────────────────────────────────────────
    #[error("{code} (error {number})")]
    #[diagnostic(
        code(exposure::otp),
        help("Request a new OTP from the health operator and validate it before uploading.")
    )]
    OtpRejected { code: ErrorCode, number: u16 },

    // ── Key distribution ─────────────────────────────────────────────
    #[error("{code} (error {number})")]
    #[diagnostic(
        code(exposure::batch_not_found),
        help("Run: exposure keys index to see which chunks are published")
    )]
    BatchNotFound { code: ErrorCode, number: u16 },

    #[error("No FAQ URL for language '{language}' in the remote configuration")]
    #[diagnostic(
        code(exposure::faq_missing),
        help("Pass an explicit location with --url.")
    )]
    FaqUnavailable { language: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend rejected the request: {code} (error {number})")]
    #[diagnostic(
        code(exposure::rejected),
        help("Check the request body against the expected schema.")
    )]
    Rejected { code: ErrorCode, number: u16 },

    #[error("{code} (error {number})")]
    #[diagnostic(code(exposure::backend))]
    Backend { code: ErrorCode, number: u16 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(exposure::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(exposure::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(exposure::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(exposure::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed | Self::Client { .. } => exit_code::CONNECTION,
            Self::OtpRejected { .. } => exit_code::OTP,
            Self::BatchNotFound { .. } | Self::FaqUnavailable { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::ConfigExists { .. } | Self::Json(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── ErrorCode → CliError mapping ─────────────────────────────────────

impl From<ErrorCode> for CliError {
    fn from(code: ErrorCode) -> Self {
        let number = code.code();
        match code {
            ErrorCode::ConnectionError => CliError::ConnectionFailed,
            ErrorCode::UnauthorizedOtp | ErrorCode::OtpAlreadyAuthorized => {
                CliError::OtpRejected { code, number }
            }
            ErrorCode::BatchNotFound | ErrorCode::NoBatchesFound => {
                CliError::BatchNotFound { code, number }
            }
            ErrorCode::BadRequest | ErrorCode::BodyNotCompliant | ErrorCode::TooManyKeysUploaded => {
                CliError::Rejected { code, number }
            }
            ErrorCode::UnknownError => CliError::Backend { code, number },
        }
    }
}

impl From<exposure_api::Error> for CliError {
    fn from(err: exposure_api::Error) -> Self {
        CliError::Client {
            message: err.to_string(),
        }
    }
}
