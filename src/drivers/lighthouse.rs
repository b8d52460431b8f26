//! LIGHTHOUSE driver: subprocess of the lighthouse CLI, accessibility
//! category only (spec §4.3).

use std::time::Duration;

use crate::domain::outcome::{ScannerId, ScannerOutcome};
use crate::drivers::subprocess::run_subprocess_driver;

pub async fn drive_lighthouse(url: &str, timeout: Duration) -> ScannerOutcome {
    run_subprocess_driver(
        ScannerId::Lighthouse,
        "lighthouse",
        url,
        &["--only-categories=accessibility", "--output=json", "--quiet", "--chrome-flags=--headless"],
        timeout,
    )
    .await
}
