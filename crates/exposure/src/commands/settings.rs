//! Remote configuration and FAQ handlers.

use tabled::Tabled;
use url::Url;

use exposure_core::NetworkManager;
use exposure_core::models::{Configuration, Faq, UserLanguage};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct FaqRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Answer")]
    content: String,
}

impl From<&Faq> for FaqRow {
    fn from(faq: &Faq) -> Self {
        const PREVIEW: usize = 60;
        let mut content: String = faq.content.chars().take(PREVIEW).collect();
        if faq.content.chars().count() > PREVIEW {
            content.push('…');
        }
        Self {
            title: faq.title.clone(),
            content,
        }
    }
}

fn configuration_detail(c: &Configuration) -> Vec<(String, String)> {
    let exposure = c.exposure_configuration();
    let faq_urls = c
        .faq_urls()
        .iter()
        .map(|(lang, url)| format!("{lang}: {url}"))
        .collect::<Vec<_>>()
        .join("\n");

    vec![
        ("Minimum build".into(), c.minimum_build_version().to_string()),
        (
            "Detection period".into(),
            format!("{}s", c.exposure_detection_period().as_secs()),
        ),
        (
            "Risk reminder period".into(),
            format!("{}s", c.risk_reminder_notification_period().as_secs()),
        ),
        ("Minimum risk score".into(), exposure.minimum_risk_score.to_string()),
        (
            "Attenuation scores".into(),
            format!("{:?}", exposure.attenuation_bucket_scores),
        ),
        (
            "Duration scores".into(),
            format!("{:?}", exposure.duration_bucket_scores),
        ),
        ("FAQ".into(), faq_urls),
        ("Privacy policy".into(), c.privacy_policy_url().to_string()),
        ("Terms of service".into(), c.tos_url().to_string()),
        (
            "Sampling (exposure / none)".into(),
            format!(
                "{} / {}",
                c.operational_info_with_exposure_sampling_rate().get(),
                c.operational_info_without_exposure_sampling_rate().get()
            ),
        ),
        (
            "Dummy analytics mean delay".into(),
            format!("{}s", c.dummy_analytics_mean_stochastic_delay()),
        ),
    ]
}

// ── Helpers ─────────────────────────────────────────────────────────

pub(crate) fn parse_language(raw: &str) -> Result<UserLanguage, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "language".into(),
        reason: format!("expected 'en', 'it', or 'de', got '{raw}'"),
    })
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn settings(
    manager: &NetworkManager,
    build: Option<u32>,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let build = build.unwrap_or(cfg.build_number);
    let configuration = manager.get_configuration(build).await?;

    let out = output::render_single(&global.output, &configuration, configuration_detail, |c| {
        c.minimum_build_version().to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn faq(
    manager: &NetworkManager,
    language: Option<String>,
    url: Option<&str>,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let language = parse_language(language.as_deref().unwrap_or(&cfg.language))?;

    let location = if let Some(raw) = url {
        Url::parse(raw).map_err(|e| CliError::Validation {
            field: "url".into(),
            reason: format!("{e}: {raw}"),
        })?
    } else {
        let configuration = manager.get_configuration(cfg.build_number).await?;
        configuration
            .faq_url(language)
            .cloned()
            .ok_or_else(|| CliError::FaqUnavailable {
                language: language.as_code().into(),
            })?
    };

    tracing::info!(%location, "fetching FAQ");
    let faqs = manager.get_faq(&location, "").await?;

    let out = output::render_list(
        &global.output,
        &faqs,
        |f| FaqRow::from(f),
        |f| f.title.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
