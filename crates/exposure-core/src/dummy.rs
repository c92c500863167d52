// ── Dummy analytics traffic ──
//
// Dummy reports carry random but valid content and the real device token,
// so on the wire they look like any other report. When to send them is the
// caller's business; this module only provides the bodies and the delay
// draw.

use std::time::Duration;

use exposure_api::models::{
    AnalyticsBody, ExposureNotificationStatus, Province, PushNotificationStatus,
};
use rand::Rng;
use strum::IntoEnumIterator;
use tracing::error;

/// Builds randomised analytics bodies from an injected RNG.
#[derive(Debug)]
pub struct DummyAnalyticsGenerator<R> {
    rng: R,
    provinces: Vec<Province>,
    exposure_statuses: Vec<ExposureNotificationStatus>,
    push_statuses: Vec<PushNotificationStatus>,
}

impl<R: Rng> DummyAnalyticsGenerator<R> {
    /// Draw from every province and every status.
    pub fn new(rng: R) -> Self {
        Self::with_choices(
            rng,
            Province::all().collect(),
            ExposureNotificationStatus::iter().collect(),
            PushNotificationStatus::iter().collect(),
        )
    }

    /// Draw from restricted sets.
    ///
    /// # Panics
    ///
    /// If any of the sets is empty.
    pub fn with_choices(
        rng: R,
        provinces: Vec<Province>,
        exposure_statuses: Vec<ExposureNotificationStatus>,
        push_statuses: Vec<PushNotificationStatus>,
    ) -> Self {
        for (name, empty) in [
            ("provinces", provinces.is_empty()),
            ("exposure notification statuses", exposure_statuses.is_empty()),
            ("push notification statuses", push_statuses.is_empty()),
        ] {
            if empty {
                error!("dummy analytics generator built with no {name}");
                panic!("No {name} defined");
            }
        }

        Self {
            rng,
            provinces,
            exposure_statuses,
            push_statuses,
        }
    }

    /// A fresh dummy body for `device_token`.
    pub fn generate(&mut self, device_token: &[u8]) -> AnalyticsBody {
        let province = pick(&mut self.rng, &self.provinces);
        let exposure = pick(&mut self.rng, &self.exposure_statuses);
        let push = pick(&mut self.rng, &self.push_statuses);
        let risky = self.rng.random_bool(0.5);
        AnalyticsBody::new(province, exposure, push, risky, device_token)
    }
}

// Non-emptiness is checked at construction.
fn pick<T: Copy, R: Rng>(rng: &mut R, items: &[T]) -> T {
    items[rng.random_range(0..items.len())]
}

/// Wait before the next dummy report: an exponential draw with mean
/// `mean_secs`.
///
/// A non-positive or non-finite mean yields zero.
pub fn next_dummy_delay<R: Rng + ?Sized>(mean_secs: f64, rng: &mut R) -> Duration {
    if !mean_secs.is_finite() || mean_secs <= 0.0 {
        return Duration::ZERO;
    }
    let uniform: f64 = rng.random();
    let secs = -mean_secs * (1.0 - uniform).ln();
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
