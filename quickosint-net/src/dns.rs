//! DNS resolution
//!
//! Forward, reverse and NS lookups behind the [`DnsBackend`] trait. The
//! resolver never fails: timeouts and NXDOMAIN produce an empty
//! [`DnsResult`] and a log line. One deadline covers every query made for a
//! target; whatever was collected before it passed is kept.

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use quickosint_core::{DnsResult, InvestigationTarget, TargetKind};

use crate::NetError;

/// Raw DNS queries
#[async_trait]
pub trait DnsBackend: Send + Sync {
    /// A/AAAA lookup
    async fn lookup_ips(&self, name: &str) -> Result<Vec<IpAddr>, NetError>;

    /// PTR lookup; `Ok(None)` when no record exists
    async fn reverse(&self, ip: IpAddr) -> Result<Option<String>, NetError>;

    /// NS lookup
    async fn name_servers(&self, name: &str) -> Result<Vec<String>, NetError>;
}

/// Backend using the hickory async resolver with the system configuration
pub struct HickoryBackend {
    resolver: TokioAsyncResolver,
}

impl HickoryBackend {
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .unwrap_or_else(|e| {
                debug!("System resolver config unavailable ({}), using defaults", e);
                (ResolverConfig::default(), ResolverOpts::default())
            });
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl DnsBackend for HickoryBackend {
    async fn lookup_ips(&self, name: &str) -> Result<Vec<IpAddr>, NetError> {
        let lookup = self
            .resolver
            .lookup_ip(name)
            .await
            .map_err(|e| NetError::Dns(e.to_string()))?;
        Ok(lookup.iter().collect())
    }

    async fn reverse(&self, ip: IpAddr) -> Result<Option<String>, NetError> {
        match self.resolver.reverse_lookup(ip).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string())),
            Err(e) if is_no_records(&e) => Ok(None),
            Err(e) => Err(NetError::Dns(e.to_string())),
        }
    }

    async fn name_servers(&self, name: &str) -> Result<Vec<String>, NetError> {
        match self.resolver.ns_lookup(name).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|ns| ns.to_string().trim_end_matches('.').to_string())
                .collect()),
            Err(e) if is_no_records(&e) => Ok(Vec::new()),
            Err(e) => Err(NetError::Dns(e.to_string())),
        }
    }
}

fn is_no_records(error: &ResolveError) -> bool {
    matches!(error.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

/// Failure-tolerant resolver driving a [`DnsBackend`]
pub struct DnsResolver {
    backend: Box<dyn DnsBackend>,
    timeout: Duration,
}

impl DnsResolver {
    pub fn new(backend: Box<dyn DnsBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Resolve a target according to its kind, within a single timeout
    pub async fn resolve(&self, target: &InvestigationTarget) -> DnsResult {
        let deadline = Instant::now() + self.timeout;
        let mut result = DnsResult::empty(target.value());

        match target.kind() {
            TargetKind::Ip => {
                // Address targets only get a PTR lookup
                if let Some(ip) = target.ip() {
                    result.reverse_hostname = self.reverse(ip, deadline).await;
                }
            }
            TargetKind::Hostname | TargetKind::Domain => {
                result.ips = self.forward_until(target.value(), deadline).await;
                if let Some(ip) = result.first_ip() {
                    result.reverse_hostname = self.reverse(ip, deadline).await;
                }
                result.name_servers = self.name_servers(target, deadline).await;
            }
            TargetKind::Username => {
                debug!("Skipping DNS for username target {}", target.value());
            }
        }

        info!(
            "DNS for {}: {} address(es), reverse {:?}",
            target.value(),
            result.ips.len(),
            result.reverse_hostname
        );
        result
    }

    /// Forward lookup only. Deduplicated, resolver order preserved, empty on failure.
    pub async fn forward(&self, name: &str) -> Vec<IpAddr> {
        self.forward_until(name, Instant::now() + self.timeout).await
    }

    async fn forward_until(&self, name: &str, deadline: Instant) -> Vec<IpAddr> {
        match self.bounded(deadline, self.backend.lookup_ips(name)).await {
            Ok(ips) => {
                let mut unique: Vec<IpAddr> = Vec::with_capacity(ips.len());
                for ip in ips {
                    if !unique.contains(&ip) {
                        unique.push(ip);
                    }
                }
                unique
            }
            Err(e) => {
                warn!("Forward lookup of {} failed: {}", name, e);
                Vec::new()
            }
        }
    }

    async fn reverse(&self, ip: IpAddr, deadline: Instant) -> Option<String> {
        match self.bounded(deadline, self.backend.reverse(ip)).await {
            Ok(name) => name,
            Err(e) => {
                debug!("Reverse lookup of {} failed: {}", ip, e);
                None
            }
        }
    }

    async fn name_servers(
        &self,
        target: &InvestigationTarget,
        deadline: Instant,
    ) -> Option<Vec<String>> {
        let candidates = std::iter::once(target.value().to_string()).chain(target.registrable_parent());

        for name in candidates {
            match self.bounded(deadline, self.backend.name_servers(&name)).await {
                Ok(servers) if !servers.is_empty() => return Some(servers),
                Ok(_) => debug!("No NS records for {}", name),
                Err(NetError::Timeout(secs)) => {
                    debug!("NS lookup of {} stopped at the {}s deadline", name, secs);
                    break;
                }
                Err(e) => debug!("NS lookup of {} failed: {}", name, e),
            }
        }
        None
    }

    async fn bounded<T, F>(&self, deadline: Instant, query: F) -> Result<T, NetError>
    where
        F: Future<Output = Result<T, NetError>>,
    {
        tokio::time::timeout_at(deadline, query)
            .await
            .map_err(|_| NetError::Timeout(self.timeout.as_secs()))?
    }
}
