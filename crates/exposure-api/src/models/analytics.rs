// Operational-info (analytics) report.
//
// Every boolean travels as a 0/1 integer and every province code is two
// letters, so two bodies with the same device token always encode to the
// same number of bytes whatever they say. Dummy reports rely on this.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Value of the `os` field.
pub const OPERATING_SYSTEM: &str = "ios";

// ── Province ─────────────────────────────────────────────────────────

const PROVINCE_CODES: &[&str] = &[
    "AG", "AL", "AN", "AO", "AP", "AQ", "AR", "AT", "AV", "BA", "BG", "BI", "BL", "BN", "BO",
    "BR", "BS", "BT", "BZ", "CA", "CB", "CE", "CH", "CL", "CN", "CO", "CR", "CS", "CT", "CZ",
    "EN", "FC", "FE", "FG", "FI", "FM", "FR", "GE", "GO", "GR", "IM", "IS", "KR", "LC", "LE",
    "LI", "LO", "LT", "LU", "MB", "MC", "ME", "MI", "MN", "MO", "MS", "MT", "NA", "NO", "NU",
    "OR", "PA", "PC", "PD", "PE", "PG", "PI", "PN", "PO", "PR", "PT", "PU", "PV", "PZ", "RA",
    "RC", "RE", "RG", "RI", "RM", "RN", "RO", "SA", "SI", "SO", "SP", "SR", "SS", "SU", "SV",
    "TA", "TE", "TN", "TO", "TP", "TR", "TS", "TV", "UD", "VA", "VB", "VC", "VE", "VI", "VR",
    "VT", "VV",
];

/// Italian province, identified by its two-letter vehicle-registration code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Province(&'static str);

impl Province {
    /// Every province, in alphabetical order of code.
    pub fn all() -> impl ExactSizeIterator<Item = Self> + Clone {
        PROVINCE_CODES.iter().map(|code| Self(*code))
    }

    pub fn from_code(code: &str) -> Option<Self> {
        PROVINCE_CODES
            .iter()
            .find(|c| c.eq_ignore_ascii_case(code))
            .map(|c| Self(*c))
    }

    pub fn code(self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Province({})", self.0)
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Unknown province code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown province code '{0}'")]
pub struct UnknownProvince(pub String);

impl FromStr for Province {
    type Err = UnknownProvince;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownProvince(s.to_owned()))
    }
}

// ── Device permission states ─────────────────────────────────────────

/// State of the exposure-notification framework on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ExposureNotificationStatus {
    Unknown,
    Restricted,
    NotAuthorized,
    Authorized,
    AuthorizedAndBluetoothOff,
    AuthorizedAndInactive,
}

impl ExposureNotificationStatus {
    /// Whether the framework is authorised and switched on. Bluetooth
    /// being off is reported separately.
    pub fn can_perform_detection(self) -> bool {
        matches!(self, Self::Authorized | Self::AuthorizedAndBluetoothOff)
    }

    pub fn is_bluetooth_active(self) -> bool {
        self != Self::AuthorizedAndBluetoothOff
    }
}

/// Push-notification authorisation on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PushNotificationStatus {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

impl PushNotificationStatus {
    pub fn allows_sending_notifications(self) -> bool {
        matches!(self, Self::Authorized | Self::Provisional)
    }
}

// ── AnalyticsBody ────────────────────────────────────────────────────

/// Body of `POST /v1/operational-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsBody {
    #[serde(rename = "os")]
    operating_system: String,
    province: String,
    #[serde(with = "flag")]
    exposure_permission: bool,
    #[serde(with = "flag")]
    notification_permission: bool,
    #[serde(with = "flag")]
    bluetooth_active: bool,
    #[serde(with = "flag")]
    exposure_notification: bool,
    device_token: String,
}

impl AnalyticsBody {
    pub fn new(
        province: Province,
        exposure_notification_status: ExposureNotificationStatus,
        push_notification_status: PushNotificationStatus,
        risky_exposure_detected: bool,
        device_token: &[u8],
    ) -> Self {
        Self {
            operating_system: OPERATING_SYSTEM.to_owned(),
            province: province.code().to_owned(),
            exposure_permission: exposure_notification_status.can_perform_detection(),
            notification_permission: push_notification_status.allows_sending_notifications(),
            bluetooth_active: exposure_notification_status.is_bluetooth_active(),
            exposure_notification: risky_exposure_detected,
            device_token: STANDARD.encode(device_token),
        }
    }

    pub fn operating_system(&self) -> &str {
        &self.operating_system
    }

    pub fn province(&self) -> &str {
        &self.province
    }

    pub fn exposure_permission(&self) -> bool {
        self.exposure_permission
    }

    pub fn notification_permission(&self) -> bool {
        self.notification_permission
    }

    pub fn bluetooth_active(&self) -> bool {
        self.bluetooth_active
    }

    pub fn exposure_notification(&self) -> bool {
        self.exposure_notification
    }

    /// Base64 device token.
    pub fn device_token(&self) -> &str {
        &self.device_token
    }
}

/// Booleans as `0`/`1`.
mod flag {
    use serde::de::{self, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::invalid_value(
                Unexpected::Unsigned(u64::from(other)),
                &"0 or 1",
            )),
        }
    }
}
