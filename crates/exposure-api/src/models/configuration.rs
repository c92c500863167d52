// Remote configuration returned by the settings endpoint.
//
// Field names on the wire are snake_case and several differ from the
// semantic names used here; `Configuration::WIRE_FIELDS` is the single list
// of keys the backend sends, and the tests pin serde's output to it.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use url::Url;

// ── UserLanguage ─────────────────────────────────────────────────────

/// Languages the app ships content for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter,
)]
pub enum UserLanguage {
    #[strum(serialize = "en")]
    English,
    #[strum(serialize = "it")]
    Italian,
    #[strum(serialize = "de")]
    German,
}

impl UserLanguage {
    /// ISO 639-1 code used as the key of `faq_url`.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Italian => "it",
            Self::German => "de",
        }
    }
}

// ── Validated scalars ────────────────────────────────────────────────

/// A non-negative, finite score weight.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Weight(f64);

impl Weight {
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Weight {
    type Error = InvalidValue;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(InvalidValue {
                what: "weight",
                value,
            })
        }
    }
}

impl From<Weight> for f64 {
    fn from(w: Weight) -> Self {
        w.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self(1.0)
    }
}

/// A probability in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SamplingRate(f64);

impl SamplingRate {
    pub fn get(self) -> f64 {
        self.0
    }

    /// Draw once against this probability.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        rng.random_bool(self.0)
    }
}

impl TryFrom<f64> for SamplingRate {
    type Error = InvalidValue;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidValue {
                what: "sampling rate",
                value,
            })
        }
    }
}

impl From<SamplingRate> for f64 {
    fn from(r: SamplingRate) -> Self {
        r.0
    }
}

impl Default for SamplingRate {
    fn default() -> Self {
        Self(1.0)
    }
}

/// A numeric configuration value outside its allowed range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid {what}: {value}")]
pub struct InvalidValue {
    what: &'static str,
    value: f64,
}

// ── ExposureDetectionConfiguration ───────────────────────────────────

/// Number of buckets in every score table.
pub const BUCKET_COUNT: usize = 8;

/// Bucketed risk score tables and their weights.
///
/// Consumed by risk-score evaluation, which lives outside this crate.
/// Table length is fixed by the type; weights are checked at decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureDetectionConfiguration {
    /// Scores that indicate Bluetooth signal strength.
    pub attenuation_bucket_scores: [u8; BUCKET_COUNT],
    pub attenuation_weight: Weight,
    /// Scores that indicate the days since the last exposure.
    pub days_since_last_exposure_bucket_scores: [u8; BUCKET_COUNT],
    pub days_since_last_exposure_weight: Weight,
    /// Scores that indicate the duration of an exposure.
    pub duration_bucket_scores: [u8; BUCKET_COUNT],
    pub duration_weight: Weight,
    /// Scores for the estimated risk of transmission.
    pub transmission_risk_bucket_scores: [u8; BUCKET_COUNT],
    pub transmission_risk_weight: Weight,
    pub minimum_risk_score: u8,
}

impl Default for ExposureDetectionConfiguration {
    fn default() -> Self {
        const SCORES: [u8; BUCKET_COUNT] = [1, 1, 2, 3, 4, 5, 6, 7];
        Self {
            attenuation_bucket_scores: SCORES,
            attenuation_weight: Weight::default(),
            days_since_last_exposure_bucket_scores: SCORES,
            days_since_last_exposure_weight: Weight::default(),
            duration_bucket_scores: SCORES,
            duration_weight: Weight::default(),
            transmission_risk_bucket_scores: SCORES,
            transmission_risk_weight: Weight::default(),
            minimum_risk_score: 1,
        }
    }
}

// ── Configuration ────────────────────────────────────────────────────

/// App configuration served by the backend for a given build number.
///
/// Immutable after decode except for the two periods that a refresh is
/// allowed to tune in place. Every key in [`WIRE_FIELDS`](Self::WIRE_FIELDS)
/// is required; a body missing any of them fails to decode.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    minimum_build_version: u32,
    service_not_active_notification_period: f64,
    #[serde(rename = "onboarding_not_completed_notification_period")]
    os_force_update_notification_period: f64,
    required_update_notification_period: f64,
    risk_reminder_notification_period: f64,
    exposure_detection_period: f64,
    exposure_configuration: ExposureDetectionConfiguration,
    exposure_info_minimum_risk_score: u32,
    maximum_exposure_detection_waiting_time: f64,
    #[serde(rename = "pp_url")]
    privacy_policy_url: Url,
    tos_url: Url,
    faq_url: BTreeMap<String, Url>,
    operational_info_with_exposure_sampling_rate: SamplingRate,
    operational_info_without_exposure_sampling_rate: SamplingRate,
    #[serde(rename = "dummy_analytics_waiting_time")]
    dummy_analytics_mean_stochastic_delay: f64,
}

impl Configuration {
    /// Every key of the wire object, in declaration order.
    pub const WIRE_FIELDS: [&'static str; 15] = [
        "minimum_build_version",
        "service_not_active_notification_period",
        "onboarding_not_completed_notification_period",
        "required_update_notification_period",
        "risk_reminder_notification_period",
        "exposure_detection_period",
        "exposure_configuration",
        "exposure_info_minimum_risk_score",
        "maximum_exposure_detection_waiting_time",
        "pp_url",
        "tos_url",
        "faq_url",
        "operational_info_with_exposure_sampling_rate",
        "operational_info_without_exposure_sampling_rate",
        "dummy_analytics_waiting_time",
    ];

    /// Builds older than this must update.
    pub fn minimum_build_version(&self) -> u32 {
        self.minimum_build_version
    }

    pub fn service_not_active_notification_period(&self) -> Duration {
        secs(self.service_not_active_notification_period)
    }

    pub fn os_force_update_notification_period(&self) -> Duration {
        secs(self.os_force_update_notification_period)
    }

    pub fn required_update_notification_period(&self) -> Duration {
        secs(self.required_update_notification_period)
    }

    pub fn risk_reminder_notification_period(&self) -> Duration {
        secs(self.risk_reminder_notification_period)
    }

    pub fn set_risk_reminder_notification_period(&mut self, period: Duration) {
        self.risk_reminder_notification_period = period.as_secs_f64();
    }

    /// Time between two consecutive exposure detections.
    pub fn exposure_detection_period(&self) -> Duration {
        secs(self.exposure_detection_period)
    }

    pub fn set_exposure_detection_period(&mut self, period: Duration) {
        self.exposure_detection_period = period.as_secs_f64();
    }

    pub fn exposure_configuration(&self) -> &ExposureDetectionConfiguration {
        &self.exposure_configuration
    }

    pub fn exposure_info_minimum_risk_score(&self) -> u32 {
        self.exposure_info_minimum_risk_score
    }

    pub fn maximum_exposure_detection_waiting_time(&self) -> Duration {
        secs(self.maximum_exposure_detection_waiting_time)
    }

    pub fn privacy_policy_url(&self) -> &Url {
        &self.privacy_policy_url
    }

    pub fn tos_url(&self) -> &Url {
        &self.tos_url
    }

    /// Every localized FAQ URL, keyed by language code.
    pub fn faq_urls(&self) -> &BTreeMap<String, Url> {
        &self.faq_url
    }

    /// FAQ URL for `language`, falling back to English. `None` only when
    /// English is missing too.
    pub fn faq_url(&self, language: UserLanguage) -> Option<&Url> {
        self.faq_url
            .get(language.as_code())
            .or_else(|| self.faq_url.get(UserLanguage::English.as_code()))
    }

    pub fn operational_info_with_exposure_sampling_rate(&self) -> SamplingRate {
        self.operational_info_with_exposure_sampling_rate
    }

    pub fn operational_info_without_exposure_sampling_rate(&self) -> SamplingRate {
        self.operational_info_without_exposure_sampling_rate
    }

    /// Mean, in seconds, of the exponential distribution that spaces dummy
    /// analytics reports.
    pub fn dummy_analytics_mean_stochastic_delay(&self) -> f64 {
        self.dummy_analytics_mean_stochastic_delay
    }

    /// Whether a real analytics report should be sent for this detection
    /// cycle, drawn against the matching sampling rate.
    pub fn should_send_analytics<R: Rng + ?Sized>(&self, with_exposure: bool, rng: &mut R) -> bool {
        let rate = if with_exposure {
            self.operational_info_with_exposure_sampling_rate
        } else {
            self.operational_info_without_exposure_sampling_rate
        };
        rate.sample(rng)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        let placeholder = placeholder_url();
        let faq_url = [UserLanguage::English, UserLanguage::Italian, UserLanguage::German]
            .into_iter()
            .map(|lang| (lang.as_code().to_owned(), placeholder.clone()))
            .collect();

        Self {
            minimum_build_version: 0,
            service_not_active_notification_period: 86_400.0,
            os_force_update_notification_period: 86_400.0,
            required_update_notification_period: 86_400.0,
            risk_reminder_notification_period: 86_400.0,
            exposure_detection_period: 7_200.0,
            exposure_configuration: ExposureDetectionConfiguration::default(),
            exposure_info_minimum_risk_score: 1,
            maximum_exposure_detection_waiting_time: 86_400.0,
            privacy_policy_url: placeholder.clone(),
            tos_url: placeholder,
            faq_url,
            operational_info_with_exposure_sampling_rate: SamplingRate::default(),
            operational_info_without_exposure_sampling_rate: SamplingRate::default(),
            dummy_analytics_mean_stochastic_delay: 2_592_000.0,
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("minimum_build_version", &self.minimum_build_version)
            .field("exposure_detection_period", &self.exposure_detection_period)
            .field("faq_url", &self.faq_url.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn placeholder_url() -> Url {
    Url::parse("http://www.example.com").unwrap_or_else(|_| unreachable!("static URL parses"))
}

/// Negative, NaN, or overflowing periods collapse to zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
