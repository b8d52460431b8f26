//! WAVE driver: HTTP GET to the external WAVE API (spec §4.3, §6 "WAVE
//! external API contract").

use std::time::{Duration, Instant};

use crate::domain::outcome::{ScannerId, ScannerOutcome};
use crate::error::DriverError;

/// Overridable via the `WAVE_API_BASE` environment variable, mirroring
/// the teacher's pattern of reading deployment-specific values through a
/// handful of `std::env` lookups rather than a config file (spec §0).
fn wave_api_base() -> String {
    std::env::var("WAVE_API_BASE").unwrap_or_else(|_| "https://wave.webaim.org/api/request".to_string())
}

pub async fn drive_wave(url: &str, timeout: Duration, api_key: Option<&str>) -> ScannerOutcome {
    let started = Instant::now();

    let Some(api_key) = api_key else {
        return ScannerOutcome::failed(
            url.to_string(),
            ScannerId::Wave,
            started.elapsed(),
            DriverError::MissingCredential.to_string(),
        );
    };

    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(err) => {
            return ScannerOutcome::failed(
                url.to_string(),
                ScannerId::Wave,
                started.elapsed(),
                DriverError::Http(err.to_string()).to_string(),
            );
        }
    };

    let request = client.get(wave_api_base()).query(&[
        ("key", api_key),
        ("url", url),
        ("reporttype", "4"),
        ("format", "json"),
    ]);

    match request.send().await {
        Ok(response) if response.status().is_success() => match response.json::<serde_json::Value>().await {
            Ok(body) if body.get("categories").is_some() => {
                ScannerOutcome::ok(url.to_string(), ScannerId::Wave, started.elapsed(), body)
            }
            Ok(_) => ScannerOutcome::failed(
                url.to_string(),
                ScannerId::Wave,
                started.elapsed(),
                DriverError::MalformedOutput("wave response missing categories".to_string()).to_string(),
            ),
            Err(err) => ScannerOutcome::failed(
                url.to_string(),
                ScannerId::Wave,
                started.elapsed(),
                DriverError::MalformedOutput(err.to_string()).to_string(),
            ),
        },
        Ok(response) => ScannerOutcome::failed(
            url.to_string(),
            ScannerId::Wave,
            started.elapsed(),
            DriverError::Http(format!("wave api returned {}", response.status())).to_string(),
        ),
        Err(err) if err.is_timeout() => ScannerOutcome::timed_out(url.to_string(), ScannerId::Wave, timeout),
        Err(err) => ScannerOutcome::failed(
            url.to_string(),
            ScannerId::Wave,
            started.elapsed(),
            DriverError::Http(err.to_string()).to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credential_fails_with_driver_error_message() {
        let outcome = drive_wave("http://x.test", Duration::from_secs(1), None).await;
        assert_eq!(outcome.status, crate::domain::outcome::ScannerStatus::Failed);
        assert_eq!(outcome.error_message.as_deref(), Some(DriverError::MissingCredential.to_string().as_str()));
    }
}
