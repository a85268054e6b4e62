//! HTTP client construction and network configuration
//!
//! Creates HTTP clients for the geolocation source and platform probes,
//! optionally routed through a SOCKS/HTTP proxy.

use reqwest::{Client, Proxy};
use std::time::Duration;
use thiserror::Error;

use quickosint_core::{
    DEFAULT_GEO_ENDPOINT, DNS_TIMEOUT_SECS, GEO_TIMEOUT_SECS, PROBE_TIMEOUT_SECS, WHOIS_TIMEOUT_SECS,
};

/// Browser-like User-Agent; several platforms reject obvious bot agents
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Network configuration shared by all lookups
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Timeout for each DNS query
    pub dns_timeout: Duration,
    /// Timeout for the geolocation request
    pub geo_timeout: Duration,
    /// Timeout for each social platform probe
    pub probe_timeout: Duration,
    /// Timeout for the WHOIS query, referrals included
    pub whois_timeout: Duration,
    /// Base URL of the geolocation source (`<endpoint>/<ip>/json`)
    pub geo_endpoint: String,
    pub user_agent: String,
    /// Optional proxy for HTTP lookups, e.g. `socks5h://127.0.0.1:9050`.
    /// DNS and WHOIS connect directly.
    pub proxy: Option<String>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            dns_timeout: Duration::from_secs(DNS_TIMEOUT_SECS),
            geo_timeout: Duration::from_secs(GEO_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            whois_timeout: Duration::from_secs(WHOIS_TIMEOUT_SECS),
            geo_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

/// Errors from network lookups
#[derive(Debug, Error)]
pub enum NetError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("DNS lookup failed: {0}")]
    Dns(String),

    #[error("WHOIS lookup failed: {0}")]
    Whois(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Create an HTTP client with the given per-request timeout
pub fn create_http_client(config: &NetConfig, timeout: Duration) -> Result<Client, NetError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .user_agent(config.user_agent.as_str());

    if let Some(proxy_url) = &config.proxy {
        let proxy = Proxy::all(proxy_url).map_err(|e| NetError::ClientBuild(e.to_string()))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| NetError::ClientBuild(e.to_string()))
}
