//! WHOIS registration lookup
//!
//! Domains and hostnames are looked up by their registrable domain, IP
//! addresses by the address itself. Raw responses are reduced to a
//! [`WhoisResult`] with a line-based parser; a failed or timed-out query
//! yields an empty result.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use whois_rust::{WhoIs, WhoIsLookupOptions};

use quickosint_core::{InvestigationTarget, TargetKind, WhoisResult};

use crate::NetError;

/// TLD to WHOIS server table, plus the `_.ip` server for address queries
pub const WHOIS_SERVERS: &str = include_str!("../data/whois-servers.json");

/// A source of raw WHOIS text
#[async_trait]
pub trait WhoisSource: Send + Sync {
    /// Raw response for a domain name or IP address
    async fn query(&self, object: &str) -> Result<String, NetError>;
}

/// Port-43 WHOIS client following registrar referrals
pub struct WhoisServerSource {
    whois: WhoIs,
}

impl WhoisServerSource {
    pub fn new() -> Result<Self, NetError> {
        let whois =
            WhoIs::from_string(WHOIS_SERVERS).map_err(|e| NetError::Whois(e.to_string()))?;
        Ok(Self { whois })
    }
}

#[async_trait]
impl WhoisSource for WhoisServerSource {
    async fn query(&self, object: &str) -> Result<String, NetError> {
        let options =
            WhoIsLookupOptions::from_string(object).map_err(|e| NetError::Whois(e.to_string()))?;
        self.whois
            .lookup_async(options)
            .await
            .map_err(|e| NetError::Whois(e.to_string()))
    }
}

/// Failure-tolerant WHOIS lookup
pub struct WhoisLookup {
    source: Box<dyn WhoisSource>,
    timeout: Duration,
}

impl WhoisLookup {
    pub fn new(source: Box<dyn WhoisSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Look up the registration behind a target. `None` for usernames.
    pub async fn lookup(&self, target: &InvestigationTarget) -> Option<WhoisResult> {
        let object = whois_object(target)?;

        match tokio::time::timeout(self.timeout, self.source.query(&object)).await {
            Ok(Ok(raw)) => {
                let result = parse_whois(&object, &raw);
                info!(
                    "WHOIS for {}: registrar {:?}",
                    object,
                    result.registrar.as_deref().unwrap_or("unknown")
                );
                Some(result)
            }
            Ok(Err(e)) => {
                warn!("WHOIS lookup for {} failed: {}", object, e);
                Some(WhoisResult::empty(&object))
            }
            Err(_) => {
                warn!(
                    "WHOIS lookup for {} timed out after {}s",
                    object,
                    self.timeout.as_secs()
                );
                Some(WhoisResult::empty(&object))
            }
        }
    }
}

/// Object to query for a target
fn whois_object(target: &InvestigationTarget) -> Option<String> {
    match target.kind() {
        TargetKind::Ip => target.ip().map(|ip| ip.to_string()),
        TargetKind::Domain => Some(target.value().to_string()),
        TargetKind::Hostname => target.registrable_parent(),
        TargetKind::Username => {
            debug!("Skipping WHOIS for username target {}", target.value());
            None
        }
    }
}

/// Reduce a raw `key: value` WHOIS response. The first occurrence of a
/// single-valued field wins.
pub fn parse_whois(query: &str, raw: &str) -> WhoisResult {
    let mut result = WhoisResult::empty(query);

    for line in raw.lines().map(str::trim) {
        if line.is_empty()
            || line.starts_with('%')
            || line.starts_with('#')
            || line.starts_with(">>>")
        {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.trim().to_ascii_lowercase().as_str() {
            "domain name" | "domain" => first(&mut result.domain_name, value),
            "registrar" | "registrar name" | "sponsoring registrar" => {
                first(&mut result.registrar, value)
            }
            "registrant organization" | "registrant organisation" | "orgname" | "org-name"
            | "organization" | "organisation" => first(&mut result.organization, value),
            "creation date" | "created" | "created on" | "registered on" | "registration time"
            | "regdate" => first(&mut result.creation_date, value),
            "registry expiry date" | "registrar registration expiration date"
            | "expiration date" | "expiry date" | "expires" | "expires on" | "paid-till" => {
                first(&mut result.expiration_date, value)
            }
            "updated date" | "updated" | "last updated" | "last modified" | "changed" => {
                first(&mut result.updated_date, value)
            }
            "name server" | "nameserver" | "nserver" => {
                // "ns1.example.net 192.0.2.1" and "NS1.EXAMPLE.NET." both occur
                if let Some(server) = value.split_whitespace().next() {
                    push_unique(
                        &mut result.name_servers,
                        server.trim_end_matches('.').to_ascii_lowercase(),
                    );
                }
            }
            "domain status" | "status" => {
                if let Some(status) = value.split_whitespace().next() {
                    push_unique(&mut result.status, status.to_string());
                }
            }
            _ => {}
        }
    }

    result
}

fn first(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}
