//! AXE driver: subprocess of the axe CLI (spec §4.3).

use std::time::Duration;

use crate::domain::outcome::{ScannerId, ScannerOutcome};
use crate::drivers::subprocess::run_subprocess_driver;

pub async fn drive_axe(url: &str, timeout: Duration) -> ScannerOutcome {
    run_subprocess_driver(ScannerId::Axe, "axe", url, &["--stdout"], timeout).await
}
