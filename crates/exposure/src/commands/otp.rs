//! OTP validation and diagnosis upload handlers.

use std::path::Path;

use exposure_core::NetworkManager;
use exposure_core::models::{DataUploadBody, Otp};

use crate::cli::{GlobalOpts, OtpArgs, OtpCommand};
use crate::error::CliError;
use crate::output;

fn parse_otp(raw: &str) -> Result<Otp, CliError> {
    Otp::new(raw).map_err(|e| CliError::Validation {
        field: "otp".into(),
        reason: e.to_string(),
    })
}

pub async fn handle(
    manager: &NetworkManager,
    args: OtpArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        OtpCommand::Validate { otp } => {
            let otp = parse_otp(&otp)?;
            manager.validate_otp(&otp).await?;
            output::print_status("OTP authorised", global.quiet);
            Ok(())
        }
    }
}

pub async fn upload(
    manager: &NetworkManager,
    otp: &str,
    file: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let otp = parse_otp(otp)?;
    let raw = tokio::fs::read(file).await?;
    let body: DataUploadBody = serde_json::from_slice(&raw)?;

    if body.teks.is_empty() {
        return Err(CliError::Validation {
            field: "teks".into(),
            reason: format!("{} contains no keys", file.display()),
        });
    }

    let keys = body.teks.len();
    manager.upload_data(body, &otp).await?;
    output::print_status(&format!("Uploaded {keys} keys"), global.quiet);
    Ok(())
}
