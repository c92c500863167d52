//! Command dispatch: bridges CLI args -> NetworkManager operations -> output.

pub mod analytics;
pub mod config_cmd;
pub mod keys;
pub mod otp;
pub mod settings;

use exposure_core::NetworkManager;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    manager: &NetworkManager,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Settings { build } => settings::settings(manager, build, cfg, global).await,
        Command::Faq { language, url } => {
            settings::faq(manager, language, url.as_deref(), cfg, global).await
        }
        Command::Keys(args) => keys::handle(manager, args, global).await,
        Command::Otp(args) => otp::handle(manager, args, global).await,
        Command::Upload { otp, file } => otp::upload(manager, &otp, &file, global).await,
        Command::Analytics(args) => analytics::handle(manager, args, cfg, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
