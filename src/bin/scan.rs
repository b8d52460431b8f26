//! `scan` — thin CLI surface over [`a11y_scan_orchestrator::Orchestrator`]
//! (spec §6): takes the same fields as `ScanRequest` plus `--simulate`,
//! prints the final report as JSON, and exits 0/1/2 on
//! completed/failed/usage-error. Hand-rolled flag parsing, no argument
//! parsing crate, matching this package's deliberately thin CLI scope.

use std::collections::BTreeSet;
use std::process::ExitCode;

use a11y_scan_orchestrator::domain::{Requester, ScanRequest, Scanner, SelectionPolicy};
use a11y_scan_orchestrator::events::EventBus;
use a11y_scan_orchestrator::orchestrator::OrchestratorConfig;
use a11y_scan_orchestrator::store::ScanStore;
use a11y_scan_orchestrator::Orchestrator;

struct Args {
    seed_url: String,
    company: String,
    email: String,
    scanners: BTreeSet<Scanner>,
    wave_credential: Option<String>,
    selection_policy: SelectionPolicy,
    max_pages: u32,
    max_depth: u32,
    simulate: bool,
}

fn usage() -> &'static str {
    "usage: scan --url URL --company NAME --email EMAIL --scanners WAVE,PA11Y,AXE,LIGHTHOUSE \
     [--wave-key KEY] [--policy representative|all|explicit] [--cap N] [--urls U1,U2,...] \
     [--max-pages N] [--max-depth N] [--simulate]"
}

fn parse_scanner(token: &str) -> Option<Scanner> {
    match token.to_ascii_uppercase().as_str() {
        "WAVE" => Some(Scanner::Wave),
        "PA11Y" => Some(Scanner::Pa11y),
        "AXE" => Some(Scanner::Axe),
        "LIGHTHOUSE" => Some(Scanner::Lighthouse),
        _ => None,
    }
}

fn parse_args(raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut seed_url = None;
    let mut company = None;
    let mut email = None;
    let mut scanners = BTreeSet::new();
    let mut wave_credential = None;
    let mut policy_name = "representative".to_string();
    let mut cap = 15u32;
    let mut explicit_urls: Vec<String> = Vec::new();
    let mut max_pages = 10u32;
    let mut max_depth = 2u32;
    let mut simulate = false;

    let mut args = raw.skip(1).peekable();
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--url" => seed_url = Some(args.next().ok_or("--url requires a value")?),
            "--company" => company = Some(args.next().ok_or("--company requires a value")?),
            "--email" => email = Some(args.next().ok_or("--email requires a value")?),
            "--scanners" => {
                let value = args.next().ok_or("--scanners requires a value")?;
                for token in value.split(',') {
                    let scanner = parse_scanner(token).ok_or_else(|| format!("unknown scanner: {token}"))?;
                    scanners.insert(scanner);
                }
            }
            "--wave-key" => wave_credential = Some(args.next().ok_or("--wave-key requires a value")?),
            "--policy" => policy_name = args.next().ok_or("--policy requires a value")?,
            "--cap" => {
                let value = args.next().ok_or("--cap requires a value")?;
                cap = value.parse().map_err(|_| format!("--cap is not a number: {value}"))?;
            }
            "--urls" => {
                let value = args.next().ok_or("--urls requires a value")?;
                explicit_urls = value.split(',').map(str::to_string).collect();
            }
            "--max-pages" => {
                let value = args.next().ok_or("--max-pages requires a value")?;
                max_pages = value.parse().map_err(|_| format!("--max-pages is not a number: {value}"))?;
            }
            "--max-depth" => {
                let value = args.next().ok_or("--max-depth requires a value")?;
                max_depth = value.parse().map_err(|_| format!("--max-depth is not a number: {value}"))?;
            }
            "--simulate" => simulate = true,
            other => return Err(format!("unrecognized flag: {other}")),
        }
    }

    let selection_policy = match policy_name.as_str() {
        "representative" => SelectionPolicy::Representative { cap },
        "all" => SelectionPolicy::All { cap },
        "explicit" => SelectionPolicy::ExplicitList { urls: explicit_urls },
        other => return Err(format!("unknown --policy: {other}")),
    };

    Ok(Args {
        seed_url: seed_url.ok_or("--url is required")?,
        company: company.ok_or("--company is required")?,
        email: email.ok_or("--email is required")?,
        scanners,
        wave_credential,
        selection_policy,
        max_pages,
        max_depth,
        simulate,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}\n{}", usage());
            return ExitCode::from(2);
        }
    };

    let request = ScanRequest {
        seed_url: args.seed_url,
        requester: Requester { company: args.company, email: args.email },
        enabled_scanners: args.scanners,
        wave_credential: args.wave_credential,
        selection_policy: args.selection_policy,
        max_pages: args.max_pages,
        max_depth: args.max_depth,
        simulate: args.simulate,
    };

    let orchestrator = Orchestrator::new(OrchestratorConfig::default(), ScanStore::new(), EventBus::new());
    let scan_id = match orchestrator.submit(request) {
        Ok(id) => id,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    let mut subscription = orchestrator.subscribe(scan_id);
    for event in &subscription.replay {
        tracing::info!(seq = event.seq, event_type = ?event.event_type, "scan event");
    }
    while let Some(event) = subscription.receiver.recv().await {
        tracing::info!(seq = event.seq, event_type = ?event.event_type, "scan event");
        if event.event_type.is_terminal() {
            break;
        }
    }

    let session = match orchestrator.status(scan_id).await {
        Ok(session) => session,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    match &session.result {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string()));
            ExitCode::from(0)
        }
        None => {
            let message = session.failure_kind.map(|kind| kind.to_string()).unwrap_or_else(|| "unknown failure".to_string());
            eprintln!("scan did not complete: {message}");
            ExitCode::from(1)
        }
    }
}
