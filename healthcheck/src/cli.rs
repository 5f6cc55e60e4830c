//! CLI module for agentaflow-healthcheck
//!
//! Every flag can also be supplied through an `AGENTAFLOW_*` environment
//! variable; unset values fall back to the local deployment defaults.

use crate::assertion::{Verbosity, DEFAULT_BODY_LIMIT};
use crate::config::{
    HarnessConfig, DEFAULT_CONCURRENCY, DEFAULT_DASHBOARD_URL, DEFAULT_METRICS_URL,
    DEFAULT_PROMETHEUS_URL, DEFAULT_SCRAPE_GRACE_SECS, DEFAULT_TOLERANCE_RATIO,
};
use crate::poller::{
    PollSettings, DEFAULT_ATTEMPT_TIMEOUT_SECS, DEFAULT_DEADLINE_SECS, DEFAULT_RETRY_INTERVAL_SECS,
};
use crate::report::OutputFormat;
use crate::suite::{CheckKind, HealthSuite};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

/// Post-deployment health verification for the AgentaFlow GPU monitoring stack
#[derive(Parser, Debug)]
#[command(name = "agentaflow-healthcheck")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    AGENTAFLOW_DASHBOARD_URL     Dashboard base URL (default: http://localhost:9000)
    AGENTAFLOW_METRICS_URL       Metrics exporter URL (default: http://localhost:9001/metrics)
    AGENTAFLOW_PROMETHEUS_URL    Prometheus base URL (default: http://localhost:9090)
    AGENTAFLOW_HC_LOG_LEVEL      Log filter (default: info)

EXIT STATUS:
    0  every check passed
    1  at least one check failed
    2  invalid configuration
"#)]
pub struct Cli {
    /// Check options
    #[command(flatten)]
    pub run: RunArgs,

    /// Subcommand to execute (defaults to running the checks)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective configuration as JSON and exit
    Config,
}

/// Options shared by all checks
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Dashboard base URL
    #[arg(long, default_value = DEFAULT_DASHBOARD_URL, env = "AGENTAFLOW_DASHBOARD_URL")]
    pub dashboard_url: String,

    /// Metrics exporter URL
    #[arg(long, default_value = DEFAULT_METRICS_URL, env = "AGENTAFLOW_METRICS_URL")]
    pub metrics_url: String,

    /// Prometheus base URL
    #[arg(long, default_value = DEFAULT_PROMETHEUS_URL, env = "AGENTAFLOW_PROMETHEUS_URL")]
    pub prometheus_url: String,

    /// Timeout in seconds for a single request
    #[arg(long, default_value_t = DEFAULT_ATTEMPT_TIMEOUT_SECS, env = "AGENTAFLOW_ATTEMPT_TIMEOUT_SECS")]
    pub attempt_timeout: u64,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = DEFAULT_RETRY_INTERVAL_SECS, env = "AGENTAFLOW_RETRY_INTERVAL_SECS")]
    pub retry_interval: u64,

    /// Seconds a polled endpoint may take to become ready
    #[arg(long, default_value_t = DEFAULT_DEADLINE_SECS, env = "AGENTAFLOW_DEADLINE_SECS")]
    pub deadline: u64,

    /// Simultaneous requests in the load burst
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, env = "AGENTAFLOW_CONCURRENCY")]
    pub concurrency: u32,

    /// Tolerated failure ratio of the load burst (0.0-1.0)
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_RATIO, env = "AGENTAFLOW_TOLERANCE")]
    pub tolerance: f64,

    /// Seconds to wait after Prometheus is ready before reading metrics
    #[arg(long, default_value_t = DEFAULT_SCRAPE_GRACE_SECS, env = "AGENTAFLOW_SCRAPE_GRACE_SECS")]
    pub scrape_grace: u64,

    /// Substring identifying the exporter in the Prometheus target list (repeatable)
    #[arg(long = "target-signature", value_name = "TEXT")]
    pub target_signatures: Vec<String>,

    /// Run only these checks (comma separated, default: all)
    #[arg(long = "check", value_enum, value_delimiter = ',')]
    pub checks: Vec<CheckKind>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Maximum response body bytes shown in failure messages
    #[arg(long, default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,

    /// Show response bodies in full
    #[arg(long, default_value_t = false)]
    pub full_bodies: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RunArgs {
    /// Build the harness configuration from the parsed flags
    pub fn to_config(&self) -> HarnessConfig {
        let defaults = HarnessConfig::default();
        let target_signatures = if self.target_signatures.is_empty() {
            defaults.target_signatures.clone()
        } else {
            self.target_signatures.clone()
        };

        HarnessConfig {
            dashboard_url: self.dashboard_url.clone(),
            metrics_url: self.metrics_url.clone(),
            prometheus_url: self.prometheus_url.clone(),
            poll: PollSettings {
                attempt_timeout: Duration::from_secs(self.attempt_timeout),
                retry_interval: Duration::from_secs(self.retry_interval),
                deadline: Duration::from_secs(self.deadline),
            },
            concurrency: self.concurrency,
            tolerance_ratio: self.tolerance,
            scrape_grace: Duration::from_secs(self.scrape_grace),
            target_signatures,
            verbosity: if self.full_bodies {
                Verbosity::Full
            } else {
                Verbosity::Truncated(self.body_limit)
            },
            ..defaults
        }
    }
}

/// Execute the CLI and return the process exit code
///
/// Configuration errors are returned as `Err`; failed checks are not errors.
pub async fn execute(cli: &Cli) -> Result<i32, anyhow::Error> {
    let config = cli.run.to_config();

    match cli.command {
        Some(Commands::Config) => {
            config.validate()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(0)
        }
        None => {
            let suite = HealthSuite::new(config)?;
            let report = suite.run(&cli.run.checks).await;
            print!("{}", report.render(cli.run.format)?);
            Ok(report.exit_code())
        }
    }
}
