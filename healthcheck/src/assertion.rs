//! Assertion layer
//!
//! Turns poller, target-query and load-burst outputs into named verdicts.
//! Failure lines carry the URL, expected vs. observed value and, where
//! available, the response body rendered according to [`Verbosity`].

use crate::error::TransportError;
use crate::load::LoadBurstResult;
use crate::poller::{EndpointCheck, PollOutcome, PollSettings};
use crate::probe::ProbeResponse;
use crate::targets::TargetQueryResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of body bytes embedded in a failure message
pub const DEFAULT_BODY_LIMIT: usize = 512;

/// How response bodies are embedded in failure messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Keep at most this many bytes
    Truncated(usize),
    /// Embed the body as-is
    Full,
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::Truncated(DEFAULT_BODY_LIMIT)
    }
}

impl Verbosity {
    /// Render a body for a diagnostic message
    pub fn render(&self, body: &str) -> String {
        match *self {
            Self::Full => body.to_string(),
            Self::Truncated(limit) if body.len() <= limit => body.to_string(),
            Self::Truncated(limit) => {
                let mut cut = limit;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                format!("{}…({} bytes omitted)", &body[..cut], body.len() - cut)
            }
        }
    }
}

/// Named pass/fail result of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Check name, e.g. "Dashboard Health"
    pub name: String,
    /// URL exercised by the check
    pub url: String,
    /// Whether the check passed
    pub passed: bool,
    /// One line per independent failure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
    /// Time spent on the check
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl Verdict {
    /// Build a verdict; it passes iff there are no failure lines
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        failures: Vec<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            passed: failures.is_empty(),
            failures,
            elapsed,
        }
    }

    /// Replace the elapsed time
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Readiness: the poller must have observed the expected status
pub fn assert_ready(
    name: &str,
    check: &EndpointCheck,
    outcome: &PollOutcome,
    verbosity: Verbosity,
) -> Verdict {
    let mut failures = Vec::new();

    if !outcome.succeeded() {
        let reason = outcome
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| format!("endpoint {} not ready", check.url));
        let mut line = format!("Failed to reach {}: {}", check.url, reason);
        if let Some(status) = outcome.last_status() {
            line.push_str(&format!(
                ". Expected status {}, got {}",
                check.expected_status, status
            ));
        }
        if let Some(body) = outcome.last_body().filter(|b| !b.is_empty()) {
            line.push_str(&format!(
                ". Response: {}",
                verbosity.render(&String::from_utf8_lossy(body))
            ));
        }
        failures.push(line);
    }

    Verdict::new(name, &check.url, failures, outcome.elapsed())
}

/// Content: every expected substring is checked independently
pub fn assert_contains_all(
    name: &str,
    url: &str,
    response: &Result<ProbeResponse, TransportError>,
    expected: &[String],
    what: &str,
) -> Verdict {
    let failures = match response {
        Ok(resp) => {
            let body = resp.text();
            let mut failures = Vec::new();
            if resp.status != 200 {
                failures.push(format!("Expected status 200 from {}, got {}", url, resp.status));
            }
            failures.extend(
                expected
                    .iter()
                    .filter(|needle| !body.contains(needle.as_str()))
                    .map(|needle| format!("Expected {} {:?} not found in {}", what, needle, url)),
            );
            failures
        }
        Err(e) => vec![format!("Failed to get {}: {}", url, e)],
    };

    Verdict::new(name, url, failures, Duration::ZERO)
}

/// Route registration: any status except `forbidden_status` proves the route exists
pub fn assert_route_registered(
    name: &str,
    url: &str,
    response: &Result<ProbeResponse, TransportError>,
    forbidden_status: u16,
) -> Verdict {
    let failures = match response {
        Ok(resp) if resp.status == forbidden_status => vec![format!(
            "{} returned {}, the route should exist",
            url, forbidden_status
        )],
        Ok(_) => Vec::new(),
        Err(e) => vec![format!("Failed to reach {}: {}", url, e)],
    };

    Verdict::new(name, url, failures, Duration::ZERO)
}

/// Target registration: report what was registered vs. what was expected
pub fn assert_target_registered(
    name: &str,
    url: &str,
    result: &TargetQueryResult,
    signatures: &[String],
    settings: &PollSettings,
    verbosity: Verbosity,
) -> Verdict {
    let mut failures = Vec::new();
    if !result.found {
        failures.push(format!(
            "Target matching {:?} not found in {} after {:?}. Last response: {}",
            signatures,
            url,
            settings.deadline,
            verbosity.render(&result.last_response_body)
        ));
    }

    Verdict::new(name, url, failures, Duration::ZERO)
}

/// Load: fail only when failures strictly exceed `total * ratio`
pub fn assert_load_tolerated(
    name: &str,
    url: &str,
    result: &LoadBurstResult,
    tolerance_ratio: f64,
) -> Verdict {
    let mut failures = Vec::new();
    if result.exceeds_tolerance(tolerance_ratio) {
        failures.push(format!(
            "Too many concurrent requests failed: {}/{} (tolerance {:.0}%)",
            result.failure_count,
            result.total_requests,
            tolerance_ratio * 100.0
        ));
    }

    Verdict::new(name, url, failures, Duration::ZERO)
}
