// Telemetry Module
//
// Initializes structured logging for processes that run actions. Library code
// only emits `tracing` events; installing a subscriber is left to binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Log filter (e.g., "info", "eventflow_actions=debug")
    pub log_filter: Option<String>,
    /// Whether to print the event target
    pub with_target: bool,
    /// Whether to emit ANSI colors
    pub ansi: bool,
    /// Write to stderr so stdout stays free for command output
    pub stderr: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "eventflow".to_string(),
            log_filter: None,
            with_target: true,
            ansi: true,
            stderr: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `EVENTFLOW_SERVICE_NAME`: Service name (default: "eventflow")
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    /// - `NO_COLOR`: Disable ANSI colors when set
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("EVENTFLOW_SERVICE_NAME")
                .unwrap_or_else(|_| "eventflow".to_string()),
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok()),
            with_target: true,
            ansi: std::env::var_os("NO_COLOR").is_none(),
            stderr: false,
        }
    }

    /// Route log output to stderr
    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    /// Filter to install, falling back to `info` when unset or invalid
    pub fn env_filter(&self) -> EnvFilter {
        self.log_filter
            .as_ref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

/// Install the global subscriber
///
/// Returns false when a subscriber was already installed; the existing one
/// stays in place.
pub fn init_telemetry(config: TelemetryConfig) -> bool {
    let stderr = config.stderr;
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .with_writer(move || -> Box<dyn std::io::Write> {
            if stderr {
                Box::new(std::io::stderr())
            } else {
                Box::new(std::io::stdout())
            }
        })
        .with_filter(config.env_filter());

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = %config.service_name, "telemetry initialized");
    }
    installed
}
