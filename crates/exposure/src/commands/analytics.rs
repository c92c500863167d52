//! Operational-info (analytics) handlers.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use exposure_core::models::{
    AnalyticsBody, ExposureNotificationStatus, Province, PushNotificationStatus,
};
use exposure_core::{DummyAnalyticsGenerator, NetworkManager, next_dummy_delay};

use crate::cli::{AnalyticsArgs, AnalyticsCommand, ExposureStatusArg, GlobalOpts, PushStatusArg};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

// ── Argument conversion ─────────────────────────────────────────────

impl From<ExposureStatusArg> for ExposureNotificationStatus {
    fn from(arg: ExposureStatusArg) -> Self {
        match arg {
            ExposureStatusArg::Unknown => Self::Unknown,
            ExposureStatusArg::Restricted => Self::Restricted,
            ExposureStatusArg::NotAuthorized => Self::NotAuthorized,
            ExposureStatusArg::Authorized => Self::Authorized,
            ExposureStatusArg::AuthorizedBluetoothOff => Self::AuthorizedAndBluetoothOff,
            ExposureStatusArg::AuthorizedInactive => Self::AuthorizedAndInactive,
        }
    }
}

impl From<PushStatusArg> for PushNotificationStatus {
    fn from(arg: PushStatusArg) -> Self {
        match arg {
            PushStatusArg::NotDetermined => Self::NotDetermined,
            PushStatusArg::Denied => Self::Denied,
            PushStatusArg::Authorized => Self::Authorized,
            PushStatusArg::Provisional => Self::Provisional,
        }
    }
}

fn decode_token(raw: &str) -> Result<Vec<u8>, CliError> {
    STANDARD.decode(raw.trim()).map_err(|e| CliError::Validation {
        field: "token".into(),
        reason: format!("not valid base64: {e}"),
    })
}

fn seeded(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

// ── Schedule view ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Schedule {
    mean_delay_secs: f64,
    next_dummy_in_secs: u64,
    send_with_exposure: bool,
    send_without_exposure: bool,
}

fn schedule_detail(s: &Schedule) -> Vec<(String, String)> {
    vec![
        ("Mean dummy delay".into(), format!("{}s", s.mean_delay_secs)),
        ("Next dummy report in".into(), format!("{}s", s.next_dummy_in_secs)),
        ("Send after exposure".into(), s.send_with_exposure.to_string()),
        ("Send without exposure".into(), s.send_without_exposure.to_string()),
    ]
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    manager: &NetworkManager,
    args: AnalyticsArgs,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AnalyticsCommand::Send {
            province,
            exposure_status,
            push_status,
            risky,
            token,
            dummy,
        } => {
            let province: Province = province.parse().map_err(|e| CliError::Validation {
                field: "province".into(),
                reason: format!("{e}"),
            })?;
            let body = AnalyticsBody::new(
                province,
                exposure_status.into(),
                push_status.into(),
                risky,
                &decode_token(&token)?,
            );
            manager.send_analytics(&body, dummy).await?;
            output::print_status("Report sent", global.quiet);
            Ok(())
        }

        AnalyticsCommand::Dummy {
            token,
            count,
            seed,
            dry_run,
        } => {
            let token = decode_token(&token)?;
            let mut generator = DummyAnalyticsGenerator::new(seeded(seed));
            let bodies: Vec<AnalyticsBody> =
                (0..count).map(|_| generator.generate(&token)).collect();

            if dry_run {
                let out = output::render_list(
                    &global.output,
                    &bodies,
                    |b| AnalyticsRow::from(b),
                    |b| b.province().to_owned(),
                );
                output::print_output(&out, global.quiet);
                return Ok(());
            }

            for body in &bodies {
                manager.send_analytics(body, true).await?;
            }
            output::print_status(&format!("Sent {count} dummy reports"), global.quiet);
            Ok(())
        }

        AnalyticsCommand::Schedule { build, seed } => {
            let configuration = manager
                .get_configuration(build.unwrap_or(cfg.build_number))
                .await?;
            let mut rng = seeded(seed);
            let mean = configuration.dummy_analytics_mean_stochastic_delay();
            let schedule = Schedule {
                mean_delay_secs: mean,
                next_dummy_in_secs: next_dummy_delay(mean, &mut rng).as_secs(),
                send_with_exposure: configuration.should_send_analytics(true, &mut rng),
                send_without_exposure: configuration.should_send_analytics(false, &mut rng),
            };
            let out = output::render_single(&global.output, &schedule, schedule_detail, |s| {
                s.next_dummy_in_secs.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(tabled::Tabled)]
struct AnalyticsRow {
    #[tabled(rename = "Province")]
    province: String,
    #[tabled(rename = "Exposure perm.")]
    exposure_permission: bool,
    #[tabled(rename = "Notification perm.")]
    notification_permission: bool,
    #[tabled(rename = "Bluetooth")]
    bluetooth_active: bool,
    #[tabled(rename = "Risky")]
    exposure_notification: bool,
}

impl From<&AnalyticsBody> for AnalyticsRow {
    fn from(b: &AnalyticsBody) -> Self {
        Self {
            province: b.province().to_owned(),
            exposure_permission: b.exposure_permission(),
            notification_permission: b.notification_permission(),
            bluetooth_active: b.bluetooth_active(),
            exposure_notification: b.exposure_notification(),
        }
    }
}
