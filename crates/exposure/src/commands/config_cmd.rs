//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

fn config_detail(cfg: &Config) -> Vec<(String, String)> {
    let url_or_default =
        |value: Option<&str>| value.map_or_else(|| "(production)".into(), str::to_owned);

    vec![
        ("build_number".into(), cfg.build_number.to_string()),
        ("language".into(), cfg.language.clone()),
        ("timeout".into(), format!("{}s", cfg.timeout)),
        (
            "ca_cert".into(),
            cfg.ca_cert
                .as_ref()
                .map_or_else(|| "(system roots)".into(), |p| p.display().to_string()),
        ),
        ("endpoints.settings".into(), url_or_default(cfg.endpoints.settings.as_deref())),
        ("endpoints.keys".into(), url_or_default(cfg.endpoints.keys.as_deref())),
        ("endpoints.upload".into(), url_or_default(cfg.endpoints.upload.as_deref())),
        ("endpoints.analytics".into(), url_or_default(cfg.endpoints.analytics.as_deref())),
    ]
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_path(global);

    match args.command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config_to(&path, &Config::default())?;
            output::print_status(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            // Reject values that would fail later, before printing them.
            config::client_config(&cfg)?;
            let out = output::render_single(&global.output, &cfg, config_detail, |c| {
                c.build_number.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
