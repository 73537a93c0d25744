use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Site-Analyzer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Transport configuration shared by the page fetch and the link probes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout for the initial page fetch (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,

    /// Timeout for each link probe (milliseconds)
    #[serde(rename = "probe-timeout-ms")]
    pub probe_timeout_ms: u64,

    /// TCP connect timeout for every request (milliseconds)
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    /// Maximum number of link probes in flight at once
    #[serde(rename = "max-concurrent-probes")]
    pub max_concurrent_probes: usize,

    /// Overall deadline for one analysis, fetch and probes included (milliseconds)
    #[serde(rename = "analysis-deadline-ms")]
    pub analysis_deadline_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            probe_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            max_concurrent_probes: 10,
            analysis_deadline_ms: 30_000,
        }
    }
}

impl HttpConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn analysis_deadline(&self) -> Duration {
        Duration::from_millis(self.analysis_deadline_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the analyzer as sent in the User-Agent header
    pub name: String,

    /// Version sent alongside the name
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "site-analyzer".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}
