//! Results produced by the individual lookups
//!
//! Every field that a data source may fail to provide is optional: absence
//! means "unknown", never zero or false.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Outcome of DNS resolution for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsResult {
    /// The name or address that was resolved
    pub target: String,
    /// Forward-resolved addresses in resolver order. Empty means "no resolution".
    pub ips: Vec<IpAddr>,
    /// PTR name of the first address (or of the target IP itself)
    pub reverse_hostname: Option<String>,
    /// Authoritative name servers for the name
    pub name_servers: Option<Vec<String>>,
}

impl DnsResult {
    pub fn empty(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ips: Vec::new(),
            reverse_hostname: None,
            name_servers: None,
        }
    }

    pub fn first_ip(&self) -> Option<IpAddr> {
        self.ips.first().copied()
    }

    pub fn is_resolved(&self) -> bool {
        !self.ips.is_empty()
    }

    pub fn has_data(&self) -> bool {
        self.is_resolved() || self.reverse_hostname.is_some() || self.name_servers.is_some()
    }
}

/// Location and network attributes of one IP address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    pub ip: Option<IpAddr>,
    pub hostname: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// ISP / organization name without the ASN prefix
    pub org: Option<String>,
    /// Autonomous system number, e.g. `AS15169`
    pub asn: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub postal: Option<String>,
    /// Proxy/CDN edge detected from organization or hostname markers
    pub is_proxy: Option<bool>,
    /// Hosting provider / datacenter detected from organization or hostname markers
    pub is_datacenter: Option<bool>,
}

impl GeoResult {
    /// A result for `ip` where nothing else is known
    pub fn unknown(ip: IpAddr) -> Self {
        Self {
            ip: Some(ip),
            ..Default::default()
        }
    }

    pub fn has_location(&self) -> bool {
        self.city.is_some()
            || self.region.is_some()
            || self.country.is_some()
            || self.coordinates().is_some()
    }

    /// Anything beyond the queried address
    pub fn has_data(&self) -> bool {
        self.has_location()
            || self.hostname.is_some()
            || self.org.is_some()
            || self.asn.is_some()
            || self.timezone.is_some()
            || self.postal.is_some()
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// `city, region, country` with unknown parts left out
    pub fn location_line(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Organization with ASN prefix, the way the source reported it
    pub fn provider_line(&self) -> Option<String> {
        match (&self.asn, &self.org) {
            (Some(asn), Some(org)) => Some(format!("{} ({})", org, asn)),
            (None, Some(org)) => Some(org.clone()),
            (Some(asn), None) => Some(asn.clone()),
            (None, None) => None,
        }
    }
}

/// Reachability of one platform probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    /// The platform answered HTTP 200
    Reachable,
    /// Non-200 status, network error or timeout
    Unreachable,
    /// No request was made
    NotChecked,
}

impl Reachability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reachable => "reachable",
            Self::Unreachable => "unreachable",
            Self::NotChecked => "not-checked",
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One platform in a social media probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialEntry {
    pub platform: String,
    pub url: String,
    pub reachability: Reachability,
}

/// Per-platform probe outcomes in platform-declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialResult {
    /// Sanitized query substituted into the URL templates
    pub query: String,
    pub entries: Vec<SocialEntry>,
}

impl SocialResult {
    pub fn reachable_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.reachability == Reachability::Reachable)
            .count()
    }

    pub fn get(&self, platform: &str) -> Option<&SocialEntry> {
        self.entries.iter().find(|e| e.platform == platform)
    }

    pub fn has_data(&self) -> bool {
        self.reachable_count() > 0
    }
}

/// Registration record for a domain or address block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisResult {
    /// Object that was queried (registrable domain or IP address)
    pub query: String,
    pub domain_name: Option<String>,
    pub registrar: Option<String>,
    /// Registrant or network owner organization
    pub organization: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub updated_date: Option<String>,
    pub name_servers: Vec<String>,
    /// EPP status codes, e.g. `clientTransferProhibited`
    pub status: Vec<String>,
}

impl WhoisResult {
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }

    pub fn has_data(&self) -> bool {
        self.domain_name.is_some()
            || self.registrar.is_some()
            || self.organization.is_some()
            || self.creation_date.is_some()
            || self.expiration_date.is_some()
            || self.updated_date.is_some()
            || !self.name_servers.is_empty()
            || !self.status.is_empty()
    }
}

/// Why geolocation was selected but not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoSkipReason {
    /// DNS ran for this target and produced no address
    NoDnsAddress,
    /// DNS was not selected and the prerequisite lookup produced no address
    Unresolved,
    /// Usernames have no address to locate
    NotNetworkTarget,
}

impl fmt::Display for GeoSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoDnsAddress => "DNS resolution produced no address",
            Self::Unresolved => "target could not be resolved to an address",
            Self::NotNetworkTarget => "target is not a hostname, domain or IP address",
        })
    }
}
