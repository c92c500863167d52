// Wire models exchanged with the backend.

pub mod analytics;
pub mod configuration;
pub mod faq;
pub mod keys;
pub mod otp;
pub mod padding;
pub mod upload;

pub use analytics::{
    AnalyticsBody, ExposureNotificationStatus, OPERATING_SYSTEM, Province, PushNotificationStatus,
    UnknownProvince,
};
pub use configuration::{
    BUCKET_COUNT, Configuration, ExposureDetectionConfiguration, InvalidValue, SamplingRate,
    UserLanguage, Weight,
};
pub use faq::Faq;
pub use keys::{KeysIndex, MAX_PUBLISHED_CHUNKS, ManifestTooLarge};
pub use otp::{InvalidOtp, Otp};
pub use padding::PADDED_BODY_LEN;
pub use upload::{
    DataUploadBody, ExposureDetectionSummary, ExposureInfo, OtpValidationBody,
    TemporaryExposureKey,
};
