//! The SCANNING stage's work-stealing scheduler (spec §4.4): fans a FIFO
//! queue of `(page, scanner)` units out to a worker pool under two
//! concurrency bounds (per-scanner token + global token, both acquired
//! before dispatch, both released on completion), honoring cooperative
//! cancellation without letting one unit's failure cancel its siblings.
//!
//! Grounded in the teacher's `crawl_engine::orchestrator::crawl_pages`
//! admission loop: a global `Semaphore` plus a second, narrower-scoped
//! permit (there: per-domain; here: per-scanner) acquired before spawning
//! each task, with `FuturesUnordered` draining completions as they land.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::{Mutex, Semaphore};
use uuid::Uuid;

use crate::domain::event::{ScanEventPayload, ScanEventType};
use crate::domain::outcome::{ScannerId, ScannerOutcome, ScannerStatus};
use crate::domain::page::PageSelection;
use crate::domain::session::ScanSession;
use crate::drivers::{self, DriverCredentials};
use crate::error::FailureKind;
use crate::events::EventBus;
use crate::orchestrator::config::OrchestratorConfig;
use crate::orchestrator::progress::scanning_progress;

struct Unit {
    page_url: String,
    scanner: ScannerId,
}

struct UnitResult {
    unit: Unit,
    outcome: ScannerOutcome,
}

/// Run SCANNING to completion: every admitted unit produces exactly one
/// [`ScannerOutcome`] (spec §3, §4.4 "completion criterion"), or is never
/// dispatched at all if cancellation was requested first.
pub async fn run_scanning_stage(
    scan_id: Uuid,
    selection: &PageSelection,
    enabled_scanners: &BTreeSet<ScannerId>,
    simulate: bool,
    config: &OrchestratorConfig,
    credentials: &DriverCredentials,
    session: &Arc<Mutex<ScanSession>>,
    events: &EventBus,
) -> Vec<ScannerOutcome> {
    let units: VecDeque<Unit> = selection
        .urls
        .iter()
        .flat_map(|page_url| enabled_scanners.iter().map(move |scanner| Unit { page_url: page_url.clone(), scanner: *scanner }))
        .collect();
    let total_units = units.len();

    let mut pending_per_page: HashMap<String, u32> = HashMap::new();
    for unit in &units {
        *pending_per_page.entry(unit.page_url.clone()).or_insert(0) += 1;
    }
    let units_total_for_page = pending_per_page.clone();

    let global = Arc::new(Semaphore::new(config.max_total.max(1)));
    let per_scanner: HashMap<ScannerId, Arc<Semaphore>> = config
        .max_per_scanner
        .iter()
        .map(|(scanner, cap)| (*scanner, Arc::new(Semaphore::new((*cap).max(1)))))
        .collect();
    let default_scanner_permits = Arc::new(Semaphore::new(config.max_total.max(1)));

    let mut queue = units;
    let mut active: FuturesUnordered<tokio::task::JoinHandle<UnitResult>> = FuturesUnordered::new();
    let mut outcomes: Vec<ScannerOutcome> = Vec::with_capacity(total_units);
    let mut completed_units = 0usize;

    loop {
        let cancel_requested = session.lock().await.cancel_requested;

        if !cancel_requested {
            while let Some(unit) = queue.front() {
                let scanner_sem = per_scanner.get(&unit.scanner).cloned().unwrap_or_else(|| default_scanner_permits.clone());

                let Ok(global_permit) = Arc::clone(&global).try_acquire_owned() else { break };
                let Ok(scanner_permit) = scanner_sem.try_acquire_owned() else {
                    drop(global_permit);
                    break;
                };

                let unit = queue.pop_front().expect("front() just confirmed Some");
                events.publish(
                    scan_id,
                    ScanEventType::ScannerStart,
                    ScanEventPayload::ScannerStart { page_url: unit.page_url.clone(), scanner: unit.scanner },
                );

                let credentials = credentials.clone();
                let timeout = config.scanner_timeout;
                let page_url = unit.page_url.clone();
                let scanner = unit.scanner;

                let handle = tokio::spawn(async move {
                    let _global_permit = global_permit;
                    let _scanner_permit = scanner_permit;
                    let outcome = if simulate {
                        drivers::drive_simulated(scanner, &page_url).await
                    } else {
                        drivers::drive(scanner, &page_url, timeout, &credentials).await
                    };
                    UnitResult { unit: Unit { page_url, scanner }, outcome }
                });
                active.push(handle);
            }
        }

        if active.is_empty() {
            break;
        }

        let next = if cancel_requested {
            // Cooperative cancellation (spec §5): in-flight units get one
            // grace period to finish on their own before being forced.
            tokio::time::timeout(config.cancel_grace_period, active.next()).await
        } else {
            Ok(active.next().await)
        };

        match next {
            Ok(Some(Ok(result))) => {
                completed_units += 1;
                record_unit_completion(
                    scan_id,
                    &result,
                    session,
                    events,
                    &mut pending_per_page,
                    &units_total_for_page,
                    total_units,
                    completed_units,
                )
                .await;
                outcomes.push(result.outcome);
            }
            Ok(Some(Err(join_err))) => {
                tracing::error!(%join_err, "scanner unit task panicked");
            }
            Ok(None) => break,
            Err(_elapsed) => {
                for handle in &active {
                    handle.abort();
                }
                break;
            }
        }
    }

    if session.lock().await.cancel_requested {
        tracing::info!(%scan_id, "scanning stage wound down after cancellation");
    }

    outcomes
}

#[allow(clippy::too_many_arguments)]
async fn record_unit_completion(
    scan_id: Uuid,
    result: &UnitResult,
    session: &Arc<Mutex<ScanSession>>,
    events: &EventBus,
    pending_per_page: &mut HashMap<String, u32>,
    units_total_for_page: &HashMap<String, u32>,
    total_units: usize,
    completed_units: usize,
) {
    let UnitResult { unit, outcome } = result;

    if outcome.status == ScannerStatus::Ok {
        events.publish(
            scan_id,
            ScanEventType::ScannerComplete,
            ScanEventPayload::ScannerComplete {
                page_url: unit.page_url.clone(),
                scanner: unit.scanner,
                status: outcome.status,
                duration_ms: outcome.duration.as_millis() as u64,
            },
        );
    } else {
        let failure_kind = if outcome.status == ScannerStatus::TimedOut {
            FailureKind::ScannerTimeout
        } else {
            FailureKind::ScannerFailed
        };
        events.publish(
            scan_id,
            ScanEventType::ScannerError,
            ScanEventPayload::ScannerError {
                page_url: unit.page_url.clone(),
                scanner: unit.scanner,
                failure_kind,
                message: outcome.error_message.clone().unwrap_or_default(),
            },
        );
    }

    {
        let mut guard = session.lock().await;
        let key = format!("{}#{}", unit.page_url, unit.scanner.label());
        guard.unit_progress.insert(key, outcome.status);
        guard.outcomes.push(outcome.clone());
        guard.progress_percent = scanning_progress(completed_units, total_units);
    }

    if let Some(remaining) = pending_per_page.get_mut(&unit.page_url) {
        *remaining -= 1;
        if *remaining == 0 {
            let total_for_page = *units_total_for_page.get(&unit.page_url).unwrap_or(&0);
            events.publish(
                scan_id,
                ScanEventType::PageProgress,
                ScanEventPayload::PageProgress {
                    page_url: unit.page_url.clone(),
                    units_completed_for_page: total_for_page,
                    units_total_for_page: total_for_page,
                },
            );
        }
    }
}
