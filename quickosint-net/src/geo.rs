//! IP geolocation
//!
//! Queries an ipinfo.io-compatible JSON source and turns the payload into a
//! [`GeoResult`], flagging proxy/CDN and datacenter networks with the
//! configured [`DetectionRules`]. A failed lookup yields an all-unknown
//! result; there are no retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

use quickosint_core::{DetectionRules, GeoResult};

use crate::{create_http_client, NetConfig, NetError};

/// Payload of an ipinfo.io `/<ip>/json` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpInfoRecord {
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// `"<lat>,<long>"`
    pub loc: Option<String>,
    /// `"AS15169 Google LLC"`
    pub org: Option<String>,
    pub postal: Option<String>,
    pub timezone: Option<String>,
    /// Set for private and reserved ranges
    #[serde(default)]
    pub bogon: bool,
}

/// A geolocation data source
#[async_trait]
pub trait GeoSource: Send + Sync {
    async fn fetch(&self, ip: IpAddr) -> Result<IpInfoRecord, NetError>;
}

/// ipinfo.io (or compatible) HTTP source
pub struct IpInfoSource {
    client: Client,
    endpoint: String,
}

impl IpInfoSource {
    pub fn new(config: &NetConfig) -> Result<Self, NetError> {
        Ok(Self {
            client: create_http_client(config, config.geo_timeout)?,
            endpoint: config.geo_endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, ip: IpAddr) -> String {
        format!("{}/{}/json", self.endpoint, ip)
    }
}

#[async_trait]
impl GeoSource for IpInfoSource {
    async fn fetch(&self, ip: IpAddr) -> Result<IpInfoRecord, NetError> {
        let url = self.url_for(ip);
        debug!("Geolocation request: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NetError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| NetError::Malformed(e.to_string()))
    }
}

/// Failure-tolerant geolocation lookup
pub struct GeoLocator {
    source: Box<dyn GeoSource>,
    rules: DetectionRules,
    timeout: Duration,
}

impl GeoLocator {
    pub fn new(source: Box<dyn GeoSource>, rules: DetectionRules, timeout: Duration) -> Self {
        Self {
            source,
            rules,
            timeout,
        }
    }

    /// Locate one address; never fails
    pub async fn locate(&self, ip: IpAddr) -> GeoResult {
        let record = match tokio::time::timeout(self.timeout, self.source.fetch(ip)).await {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                warn!("Geolocation lookup for {} failed: {}", ip, e);
                return GeoResult::unknown(ip);
            }
            Err(_) => {
                warn!(
                    "Geolocation lookup for {} timed out after {}s",
                    ip,
                    self.timeout.as_secs()
                );
                return GeoResult::unknown(ip);
            }
        };

        if record.bogon {
            info!("{} is a private or reserved address; no geolocation available", ip);
            return GeoResult::unknown(ip);
        }

        let result = to_geo_result(ip, record, &self.rules);
        info!(
            "Geolocation for {}: {}",
            ip,
            result.location_line().unwrap_or_else(|| "unknown".to_string())
        );
        result
    }
}

/// Convert a source record into a result, applying the detection rules
pub fn to_geo_result(ip: IpAddr, record: IpInfoRecord, rules: &DetectionRules) -> GeoResult {
    let hostname = non_empty(record.hostname);
    let raw_org = non_empty(record.org);
    let flags = rules.classify(raw_org.as_deref(), hostname.as_deref());
    let (asn, org) = match raw_org {
        Some(raw) => split_org(&raw),
        None => (None, None),
    };
    let (latitude, longitude) = match non_empty(record.loc) {
        Some(loc) => parse_loc(&loc),
        None => (None, None),
    };

    GeoResult {
        ip: Some(ip),
        hostname,
        city: non_empty(record.city),
        region: non_empty(record.region),
        country: non_empty(record.country),
        org,
        asn,
        latitude,
        longitude,
        timezone: non_empty(record.timezone),
        postal: non_empty(record.postal),
        is_proxy: flags.is_proxy,
        is_datacenter: flags.is_datacenter,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split `"AS15169 Google LLC"` into ASN and organization name
fn split_org(raw: &str) -> (Option<String>, Option<String>) {
    let (first, rest) = match raw.split_once(' ') {
        Some((first, rest)) => (first, rest.trim()),
        None => (raw, ""),
    };

    let is_asn = first.len() > 2
        && first.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("AS"))
        && first[2..].chars().all(|c| c.is_ascii_digit());

    if !is_asn {
        return (None, Some(raw.to_string()));
    }
    let org = if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    };
    (Some(first.to_ascii_uppercase()), org)
}

/// Parse `"lat,long"`; both parts must be valid coordinates
fn parse_loc(loc: &str) -> (Option<f64>, Option<f64>) {
    let mut parts = loc.split(',').map(|p| p.trim().parse::<f64>());
    match (parts.next(), parts.next()) {
        (Some(Ok(lat)), Some(Ok(lon)))
            if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) =>
        {
            (Some(lat), Some(lon))
        }
        _ => (None, None),
    }
}
