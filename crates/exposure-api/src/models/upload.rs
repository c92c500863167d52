// Diagnosis upload and OTP validation bodies.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::padding;
use crate::error::Error;

/// A temporary exposure key as handed over by the device framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryExposureKey {
    /// Base64 key material.
    pub key_data: String,
    pub rolling_start_number: u32,
    pub rolling_period: u32,
}

impl TemporaryExposureKey {
    pub fn new(key_data: &[u8], rolling_start_number: u32, rolling_period: u32) -> Self {
        Self {
            key_data: STANDARD.encode(key_data),
            rolling_start_number,
            rolling_period,
        }
    }
}

/// Per-exposure detail attached to a detection summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureInfo {
    pub date: NaiveDate,
    /// Seconds.
    pub duration: u32,
    pub attenuation_value: u8,
    pub attenuation_durations: Vec<u32>,
    pub transmission_risk_level: u8,
    pub total_risk_score: u32,
}

/// Outcome of one exposure detection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureDetectionSummary {
    pub date: NaiveDate,
    pub matched_key_count: u32,
    pub days_since_last_exposure: u32,
    pub attenuation_durations: Vec<u32>,
    pub maximum_risk_score: u32,
    #[serde(default)]
    pub exposure_info: Vec<ExposureInfo>,
}

/// Body of the diagnosis upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataUploadBody {
    pub teks: Vec<TemporaryExposureKey>,
    pub province: String,
    #[serde(default)]
    pub exposure_detection_summaries: Vec<ExposureDetectionSummary>,
    #[serde(default)]
    pub padding: String,
}

impl DataUploadBody {
    pub fn new(
        teks: Vec<TemporaryExposureKey>,
        province: impl Into<String>,
        exposure_detection_summaries: Vec<ExposureDetectionSummary>,
    ) -> Self {
        Self {
            teks,
            province: province.into(),
            exposure_detection_summaries,
            padding: String::new(),
        }
    }

    /// Replace `padding` so the encoded body is `target_len` bytes, or
    /// left unpadded if it is already at least that large.
    pub fn padded<R: Rng + ?Sized>(mut self, target_len: usize, rng: &mut R) -> Result<Self, Error> {
        self.padding.clear();
        let missing = padding::missing_len(&self, target_len)?;
        self.padding = padding::filler(missing, rng);
        Ok(self)
    }
}

/// Body of the OTP check: nothing but padding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpValidationBody {
    pub padding: String,
}

impl OtpValidationBody {
    pub fn padded<R: Rng + ?Sized>(target_len: usize, rng: &mut R) -> Result<Self, Error> {
        let missing = padding::missing_len(&Self::default(), target_len)?;
        Ok(Self {
            padding: padding::filler(missing, rng),
        })
    }
}
