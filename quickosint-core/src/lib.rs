//! QuickOSINT Core - Domain model and reporting for single-target OSINT
//!
//! This crate provides the network-free building blocks:
//! - Target classification (IP, domain, hostname, username)
//! - Lookup result types (DNS, geolocation, social media, WHOIS)
//! - Social platform registry with URL templates
//! - Proxy/CDN and datacenter detection rules
//! - Report assembly, executive summary and text rendering

pub mod error;
pub mod target;
pub mod operations;
pub mod findings;
pub mod platforms;
pub mod rules;
pub mod summary;
pub mod report;

pub use error::*;
pub use target::*;
pub use operations::*;
pub use findings::*;
pub use platforms::*;
pub use rules::*;
pub use summary::*;
pub use report::*;

/// Timeout for each DNS query in seconds
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// Timeout for the geolocation request in seconds
pub const GEO_TIMEOUT_SECS: u64 = 10;

/// Timeout for the WHOIS query (including referrals) in seconds
pub const WHOIS_TIMEOUT_SECS: u64 = 10;

/// Timeout for each social platform probe in seconds
pub const PROBE_TIMEOUT_SECS: u64 = 5;

/// Default geolocation data source (ipinfo.io JSON API)
pub const DEFAULT_GEO_ENDPOINT: &str = "https://ipinfo.io";

/// Width of rule lines in the rendered report
pub const REPORT_WIDTH: usize = 80;
