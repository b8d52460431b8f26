//! Error taxonomy shared across the orchestrator (spec §7).
//!
//! Each module boundary gets its own `thiserror` leaf type, the same way
//! the teacher keeps `CrawlError` at the crawl-engine boundary and lets
//! call sites fold everything into `anyhow::Result`. [`FailureKind`] is the
//! cross-cutting enum surfaced on terminal `FAILED` sessions and in
//! `SCANNER_ERROR` event payloads — it's what a caller actually branches
//! on, independent of which module produced the underlying error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The taxonomy of terminal / per-unit failure reasons from spec §7.
///
/// `VALIDATION` never reaches a session (rejected synchronously at
/// submission, before a `ScanSession` exists) but is kept in the enum so
/// the submission endpoint (an external collaborator, §6) has a single
/// type to report through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    Validation,
    DiscoveryEmpty,
    ScannerTimeout,
    ScannerFailed,
    AllScannersFailed,
    NormalizationError,
    Cancelled,
    SessionTimeout,
    /// Invariant violation in the owning worker; not a condition the
    /// spec names explicitly, but §7 requires *some* terminal kind when
    /// a programming error crashes the worker rather than crashing the
    /// process.
    Internal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "VALIDATION",
            Self::DiscoveryEmpty => "DISCOVERY_EMPTY",
            Self::ScannerTimeout => "SCANNER_TIMEOUT",
            Self::ScannerFailed => "SCANNER_FAILED",
            Self::AllScannersFailed => "ALL_SCANNERS_FAILED",
            Self::NormalizationError => "NORMALIZATION_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::SessionTimeout => "SESSION_TIMEOUT",
            Self::Internal => "INTERNAL",
        };
        write!(f, "{s}")
    }
}

/// Rejected at submission time, synchronously, before a session exists
/// (spec §6, §7 `VALIDATION`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("seed url is not parseable or is not http/https: {0}")]
    InvalidUrl(String),
    #[error("requester email is not syntactically valid: {0}")]
    InvalidEmail(String),
    #[error("at least one scanner must be enabled")]
    NoScannersEnabled,
    #[error("max_pages must be between 1 and 50, got {0}")]
    MaxPagesOutOfRange(u32),
    #[error("max_depth must be between 1 and 3, got {0}")]
    MaxDepthOutOfRange(u32),
    #[error("explicit-list selection policy requires at least one url")]
    EmptyExplicitList,
}

/// Discovery (C2) boundary errors.
#[derive(Debug, Error, Clone)]
pub enum DiscoveryError {
    #[error("seed url could not be fetched: {0}")]
    SeedUnreachable(String),
    #[error("discovery produced zero pages")]
    Empty,
}

/// `OrchestratorConfigBuilder::build()` validation errors (spec §1 ambient
/// stack: "Config validation at construction").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_total must be at least 1")]
    MaxTotalZero,
    #[error("every scanner's max_per_scanner must be at least 1")]
    MaxPerScannerZero,
}

/// Driver (C1) boundary errors. These never propagate past the driver —
/// they're folded into a [`crate::domain::ScannerOutcome`] status, never
/// raised to the orchestrator (spec §4.3: "explicit `ScannerOutcome`
/// values; only invariant violations crash").
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    #[error("http request to scanner api failed: {0}")]
    Http(String),
    #[error("scanner api key missing")]
    MissingCredential,
    #[error("scanner subprocess exited non-zero: {status}, stderr: {stderr}")]
    SubprocessFailed { status: i32, stderr: String },
    #[error("driver exceeded its {0:?} timeout budget")]
    TimedOut(std::time::Duration),
    #[error("scanner output was not valid json: {0}")]
    MalformedOutput(String),
    #[error("failed to spawn scanner subprocess: {0}")]
    Spawn(String),
}

/// Orchestrator (C4) boundary errors.
#[derive(Debug, Error, Clone)]
pub enum OrchestratorError {
    #[error("scan {0} not found")]
    NotFound(uuid::Uuid),
    #[error("scan {0} already terminal, cannot be cancelled")]
    AlreadyTerminal(uuid::Uuid),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Structured, actionable error text builder for log/diagnostic output —
/// mirrors the teacher's `mcp::validation::ErrorContext` builder.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    operation: String,
    details: Vec<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            details: Vec::new(),
        }
    }

    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        if self.details.is_empty() {
            return format!("{} failed", self.operation);
        }
        format!("{} failed: {}", self.operation, self.details.join("; "))
    }
}
