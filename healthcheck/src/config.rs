//! Harness configuration
//!
//! Base URLs, timing constants and the expected content of each service.
//! Defaults reproduce the fixed values of a local docker-compose deployment;
//! every field can be overridden from the command line or `AGENTAFLOW_*`
//! environment variables (see [`crate::cli`]).

use crate::assertion::Verbosity;
use crate::error::{HarnessError, HarnessResult};
use crate::poller::PollSettings;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default dashboard base URL
pub const DEFAULT_DASHBOARD_URL: &str = "http://localhost:9000";
/// Default metrics exporter URL
pub const DEFAULT_METRICS_URL: &str = "http://localhost:9001/metrics";
/// Default Prometheus base URL
pub const DEFAULT_PROMETHEUS_URL: &str = "http://localhost:9090";
/// Default number of simultaneous requests in a load burst
pub const DEFAULT_CONCURRENCY: u32 = 50;
/// Default tolerated failure ratio for a load burst
pub const DEFAULT_TOLERANCE_RATIO: f64 = 0.10;
/// Default pause after Prometheus is ready, before reading metrics
pub const DEFAULT_SCRAPE_GRACE_SECS: u64 = 5;

/// Full harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Dashboard base URL (`/health`, `/`, `/ws` are appended)
    pub dashboard_url: String,
    /// Metrics exporter URL, used as-is
    pub metrics_url: String,
    /// Prometheus base URL (`/-/healthy`, `/-/ready`, `/api/v1/targets` are appended)
    pub prometheus_url: String,
    /// Poll timing shared by every poller call
    pub poll: PollSettings,
    /// Requests per load burst
    pub concurrency: u32,
    /// Tolerated failure ratio (0.0-1.0)
    pub tolerance_ratio: f64,
    /// Wait after Prometheus readiness before reading metrics
    pub scrape_grace: Duration,
    /// Substrings identifying the exporter in the target list
    pub target_signatures: Vec<String>,
    /// Metric names the exporter must expose
    pub expected_metrics: Vec<String>,
    /// Substrings the dashboard page must contain
    pub expected_dashboard_content: Vec<String>,
    /// Body rendering in failure messages
    pub verbosity: Verbosity,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            metrics_url: DEFAULT_METRICS_URL.to_string(),
            prometheus_url: DEFAULT_PROMETHEUS_URL.to_string(),
            poll: PollSettings::default(),
            concurrency: DEFAULT_CONCURRENCY,
            tolerance_ratio: DEFAULT_TOLERANCE_RATIO,
            scrape_grace: Duration::from_secs(DEFAULT_SCRAPE_GRACE_SECS),
            target_signatures: to_strings(&["agentaflow", "9001"]),
            expected_metrics: to_strings(&[
                "gpu_temperature_celsius",
                "gpu_utilization_percent",
                "gpu_memory_used_bytes",
                "gpu_power_usage_watts",
            ]),
            expected_dashboard_content: to_strings(&[
                "AgentaFlow GPU Monitoring",
                "GPU Performance Metrics",
                "Cost Analytics",
                "<!DOCTYPE html>",
            ]),
            verbosity: Verbosity::default(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl HarnessConfig {
    /// Join a path onto the dashboard base URL
    pub fn dashboard(&self, path: &str) -> String {
        join_url(&self.dashboard_url, path)
    }

    /// Join a path onto the Prometheus base URL
    pub fn prometheus(&self, path: &str) -> String {
        join_url(&self.prometheus_url, path)
    }

    /// Reject configurations that cannot produce meaningful checks
    ///
    /// This is the only fatal error class of the harness.
    pub fn validate(&self) -> HarnessResult<()> {
        parse_absolute("dashboard_url", &self.dashboard_url)?;
        parse_absolute("metrics_url", &self.metrics_url)?;
        parse_absolute("prometheus_url", &self.prometheus_url)?;

        if self.poll.attempt_timeout.is_zero() {
            return Err(HarnessError::Config(
                "attempt timeout must be greater than zero".to_string(),
            ));
        }
        if self.poll.retry_interval.is_zero() {
            return Err(HarnessError::Config(
                "retry interval must be greater than zero".to_string(),
            ));
        }
        if self.poll.attempt_timeout >= self.poll.deadline {
            return Err(HarnessError::Config(format!(
                "attempt timeout ({:?}) must be shorter than the deadline ({:?})",
                self.poll.attempt_timeout, self.poll.deadline
            )));
        }
        if self.concurrency == 0 {
            return Err(HarnessError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tolerance_ratio) {
            return Err(HarnessError::Config(format!(
                "tolerance ratio must be within 0.0-1.0, got {}",
                self.tolerance_ratio
            )));
        }
        if self.target_signatures.iter().all(|s| s.is_empty()) {
            return Err(HarnessError::Config(
                "at least one non-empty target signature is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Join `path` onto `base`, tolerating a trailing slash on the base
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn parse_absolute(name: &'static str, url: &str) -> HarnessResult<Url> {
    let parsed = Url::parse(url).map_err(|e| HarnessError::InvalidUrl {
        name,
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(HarnessError::InvalidUrl {
            name,
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(parsed)
}
