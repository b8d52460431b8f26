//! PA11Y driver: subprocess of a Node.js runner script (spec §4.3).

use std::time::Duration;

use crate::domain::outcome::{ScannerId, ScannerOutcome};
use crate::drivers::subprocess::run_subprocess_driver;

pub async fn drive_pa11y(url: &str, timeout: Duration) -> ScannerOutcome {
    run_subprocess_driver(ScannerId::Pa11y, "pa11y", url, &["--reporter", "json"], timeout).await
}
