//! Scanner Drivers (C1, spec §4.3): one capability-set contract,
//! `drive(url, timeout, credentials?) -> ScannerOutcome`, implemented
//! once per external tool.

mod axe;
mod lighthouse;
mod pa11y;
mod simulate;
mod subprocess;
mod wave;

pub use simulate::drive_simulated;
pub use wave::drive_wave;

use std::time::Duration;

use crate::domain::outcome::{ScannerId, ScannerOutcome};

/// Credentials a driver may need (only WAVE uses one today; kept generic
/// so new drivers don't need a signature change).
#[derive(Debug, Clone, Default)]
pub struct DriverCredentials {
    pub wave_api_key: Option<String>,
}

/// Drive one (url, scanner) unit of work to completion. Never returns
/// `Err` — all failure modes are folded into a non-OK [`ScannerOutcome`]
/// (spec §9: "Replace [exceptions] with explicit ScannerOutcome values;
/// only invariant violations crash").
pub async fn drive(
    scanner: ScannerId,
    url: &str,
    timeout: Duration,
    credentials: &DriverCredentials,
) -> ScannerOutcome {
    match scanner {
        ScannerId::Wave => wave::drive_wave(url, timeout, credentials.wave_api_key.as_deref()).await,
        ScannerId::Pa11y => pa11y::drive_pa11y(url, timeout).await,
        ScannerId::Axe => axe::drive_axe(url, timeout).await,
        ScannerId::Lighthouse => lighthouse::drive_lighthouse(url, timeout).await,
    }
}
