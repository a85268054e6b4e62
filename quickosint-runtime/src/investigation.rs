//! Investigation driver
//!
//! Moves one investigation through its phases:
//! - CollectingInput: classify the target (prompting if interactive)
//! - SelectingOperations: fixed selection or the operation menu
//! - Running: DNS, geolocation, social and WHOIS lookups, in that order
//! - Reporting: print the report, then save it if an output path was given
//!
//! Lookups recover from their own failures, so a run always reaches a report
//! once the target is valid.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, info};

use quickosint_core::{
    DetectionRules, DnsResult, GeoSkipReason, InvestigationReport, InvestigationTarget, Operation,
    OperationSet,
};
use quickosint_net::{
    DnsResolver, GeoLocator, HickoryBackend, HttpPresenceCheck, IpInfoSource, NetConfig,
    SocialProber, WhoisLookup, WhoisServerSource,
};

use crate::Console;

/// Investigation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CollectingInput,
    SelectingOperations,
    Running,
    Reporting,
    Done,
}

/// Where the geolocation address comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoInput {
    /// The target is an address
    Direct(IpAddr),
    /// First address from the DNS operation
    FromDns(IpAddr),
    /// DNS was not selected; resolved just for geolocation
    Prerequisite(IpAddr),
    Skipped(GeoSkipReason),
}

/// How the target and operations are obtained
#[derive(Debug, Clone)]
pub enum EntryMode {
    /// Everything supplied up front
    Directive {
        target: String,
        operations: OperationSet,
    },
    /// Prompt for whatever is missing
    Interactive {
        target: Option<String>,
        operations: Option<OperationSet>,
    },
}

/// Settings for the real network backends
#[derive(Debug, Clone, Default)]
pub struct InvestigationConfig {
    pub net: NetConfig,
    pub rules: DetectionRules,
}

/// Runs investigations against a set of lookup components
pub struct Investigator {
    dns: DnsResolver,
    geo: GeoLocator,
    social: SocialProber,
    whois: WhoisLookup,
    phase: Phase,
}

impl Investigator {
    /// Build with the system resolver and HTTP backends
    pub fn from_config(config: InvestigationConfig) -> Result<Self> {
        let net = &config.net;
        let dns = DnsResolver::new(Box::new(HickoryBackend::new(net.dns_timeout)), net.dns_timeout);
        let geo = GeoLocator::new(
            Box::new(IpInfoSource::new(net).context("Failed to create geolocation client")?),
            config.rules,
            net.geo_timeout,
        );
        let social = SocialProber::new(
            Box::new(HttpPresenceCheck::new(net).context("Failed to create probe client")?),
            net.probe_timeout,
        );
        let whois = WhoisLookup::new(
            Box::new(WhoisServerSource::new().context("Failed to load WHOIS server table")?),
            net.whois_timeout,
        );

        Ok(Self::with_components(dns, geo, social, whois))
    }

    pub fn with_components(
        dns: DnsResolver,
        geo: GeoLocator,
        social: SocialProber,
        whois: WhoisLookup,
    ) -> Self {
        Self {
            dns,
            geo,
            social,
            whois,
            phase: Phase::CollectingInput,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run one investigation end to end.
    ///
    /// The report is printed before it is saved, so a save failure still
    /// leaves the report on the console.
    pub async fn execute<R: BufRead, W: Write>(
        &mut self,
        mode: EntryMode,
        console: &mut Console<R, W>,
        output: Option<&Path>,
    ) -> Result<InvestigationReport> {
        self.advance(Phase::CollectingInput);
        let (target, preset) = match mode {
            EntryMode::Directive { target, operations } => {
                (InvestigationTarget::parse(&target)?, Some(operations))
            }
            EntryMode::Interactive {
                target: Some(target),
                operations,
            } => (InvestigationTarget::parse(&target)?, operations),
            EntryMode::Interactive {
                target: None,
                operations,
            } => (console.prompt_target()?, operations),
        };
        info!("Target: {}", target);

        self.advance(Phase::SelectingOperations);
        let operations = match preset {
            Some(operations) if !operations.is_empty() => operations,
            _ => console.prompt_operations()?,
        };
        info!("Operations: {}", operations);

        self.advance(Phase::Running);
        let report = self.run_operations(&target, operations).await;

        self.advance(Phase::Reporting);
        console.print_report(&report)?;
        if let Some(path) = output {
            report
                .save(path)
                .with_context(|| format!("Report was printed but could not be saved to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }

        self.advance(Phase::Done);
        Ok(report)
    }

    /// Run the selected operations in declaration order and assemble the report
    pub async fn run_operations(
        &self,
        target: &InvestigationTarget,
        operations: OperationSet,
    ) -> InvestigationReport {
        let mut builder = InvestigationReport::builder(target.clone(), operations);
        let mut dns_result: Option<DnsResult> = None;
        let total = operations.len();

        for (index, op) in operations.iter().enumerate() {
            info!("[{}/{}] {}: {}", index + 1, total, op.label(), target.value());

            match op {
                Operation::Dns => {
                    let result = self.dns.resolve(target).await;
                    dns_result = Some(result.clone());
                    builder = builder.dns(result);
                }
                Operation::Geo => match self.geo_input(target, dns_result.as_ref()).await {
                    GeoInput::Direct(ip) | GeoInput::FromDns(ip) | GeoInput::Prerequisite(ip) => {
                        builder = builder.geo(self.geo.locate(ip).await);
                    }
                    GeoInput::Skipped(reason) => {
                        info!("Geolocation skipped: {}", reason);
                        builder = builder.geo_skipped(reason);
                    }
                },
                Operation::Social => {
                    builder = builder.social(self.social.probe(target.value()).await);
                }
                Operation::Whois => match self.whois.lookup(target).await {
                    Some(result) => builder = builder.whois(result),
                    None => info!("WHOIS skipped: {} is not a network target", target.value()),
                },
            }
        }

        builder.build()
    }

    /// Pick the address to geolocate
    pub async fn geo_input(&self, target: &InvestigationTarget, dns: Option<&DnsResult>) -> GeoInput {
        if let Some(ip) = target.ip() {
            return GeoInput::Direct(ip);
        }
        if !target.kind().is_network_name() {
            return GeoInput::Skipped(GeoSkipReason::NotNetworkTarget);
        }

        match dns {
            Some(result) => result
                .first_ip()
                .map(GeoInput::FromDns)
                .unwrap_or(GeoInput::Skipped(GeoSkipReason::NoDnsAddress)),
            None => {
                debug!("Resolving {} for geolocation", target.value());
                self.dns
                    .forward(target.value())
                    .await
                    .first()
                    .copied()
                    .map(GeoInput::Prerequisite)
                    .unwrap_or(GeoInput::Skipped(GeoSkipReason::Unresolved))
            }
        }
    }

    fn advance(&mut self, next: Phase) {
        debug!("Phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quickosint_core::{GeoResult, Reachability, SOCIAL_PLATFORMS};
    use quickosint_net::{
        DnsBackend, GeoSource, IpInfoRecord, NetError, PresenceCheck, WhoisSource,
    };
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Calls = Arc<Mutex<Vec<String>>>;

    #[derive(Default)]
    struct FakeDns {
        forward: HashMap<String, Vec<IpAddr>>,
        ptr: HashMap<IpAddr, String>,
        calls: Calls,
    }

    #[async_trait]
    impl DnsBackend for FakeDns {
        async fn lookup_ips(&self, name: &str) -> Result<Vec<IpAddr>, NetError> {
            self.calls.lock().unwrap().push(format!("A {}", name));
            Ok(self.forward.get(name).cloned().unwrap_or_default())
        }

        async fn reverse(&self, ip: IpAddr) -> Result<Option<String>, NetError> {
            self.calls.lock().unwrap().push(format!("PTR {}", ip));
            Ok(self.ptr.get(&ip).cloned())
        }

        async fn name_servers(&self, name: &str) -> Result<Vec<String>, NetError> {
            self.calls.lock().unwrap().push(format!("NS {}", name));
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeGeo {
        record: Option<IpInfoRecord>,
        hang: bool,
        asked: Calls,
    }

    #[async_trait]
    impl GeoSource for FakeGeo {
        async fn fetch(&self, ip: IpAddr) -> Result<IpInfoRecord, NetError> {
            self.asked.lock().unwrap().push(ip.to_string());
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.record.clone().ok_or(NetError::Status(404))
        }
    }

    /// 200 for URLs containing one of the hosts, 404 otherwise
    #[derive(Default)]
    struct FakeCheck {
        found: Vec<&'static str>,
    }

    #[async_trait]
    impl PresenceCheck for FakeCheck {
        async fn status(&self, url: &str) -> Result<u16, NetError> {
            if self.found.iter().any(|host| url.contains(host)) {
                Ok(200)
            } else {
                Ok(404)
            }
        }
    }

    /// Answers every query with the same record
    #[derive(Default)]
    struct FakeWhois {
        raw: Option<&'static str>,
        asked: Calls,
    }

    #[async_trait]
    impl WhoisSource for FakeWhois {
        async fn query(&self, object: &str) -> Result<String, NetError> {
            self.asked.lock().unwrap().push(object.to_string());
            self.raw
                .map(str::to_string)
                .ok_or_else(|| NetError::Whois("connection refused".to_string()))
        }
    }

    const EXAMPLE_WHOIS: &str = "Domain Name: EXAMPLE.COM
Registrar: RESERVED-Internet Assigned Numbers Authority
Creation Date: 1995-08-14T04:00:00Z
Registry Expiry Date: 2025-08-13T04:00:00Z
";

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn comcast_record() -> IpInfoRecord {
        IpInfoRecord {
            city: Some("Norwell".to_string()),
            region: Some("Massachusetts".to_string()),
            country: Some("US".to_string()),
            loc: Some("42.1596,-70.8217".to_string()),
            org: Some("AS7922 Comcast Cable Communications, LLC".to_string()),
            ..Default::default()
        }
    }

    fn investigator(dns: FakeDns, geo: FakeGeo, check: FakeCheck) -> Investigator {
        with_whois(dns, geo, check, FakeWhois::default())
    }

    fn with_whois(dns: FakeDns, geo: FakeGeo, check: FakeCheck, whois: FakeWhois) -> Investigator {
        Investigator::with_components(
            DnsResolver::new(Box::new(dns), Duration::from_secs(10)),
            GeoLocator::new(Box::new(geo), DetectionRules::default(), Duration::from_secs(10)),
            SocialProber::new(Box::new(check), Duration::from_secs(5)),
            WhoisLookup::new(Box::new(whois), Duration::from_secs(10)),
        )
    }

    fn target(s: &str) -> InvestigationTarget {
        InvestigationTarget::parse(s).unwrap()
    }

    fn ops(list: &[Operation]) -> OperationSet {
        list.iter().copied().collect()
    }

    fn quiet_console() -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(Vec::new()), Vec::new())
    }

    #[tokio::test]
    async fn test_domain_dns_and_geo() {
        let mut dns = FakeDns::default();
        dns.forward
            .insert("example.com".to_string(), vec![ip("93.184.216.34")]);
        let asked = Calls::default();
        let geo = FakeGeo {
            record: Some(comcast_record()),
            asked: asked.clone(),
            ..Default::default()
        };
        let investigator = investigator(dns, geo, FakeCheck::default());

        let report = investigator
            .run_operations(&target("example.com"), ops(&[Operation::Dns, Operation::Geo]))
            .await;

        assert_eq!(*asked.lock().unwrap(), vec!["93.184.216.34".to_string()]);
        let findings = &report.summary().key_findings;
        assert!(findings.contains(&"Target resolved to IP: 93.184.216.34.".to_string()));
        assert!(findings
            .iter()
            .any(|f| f == "Physical location: Norwell, Massachusetts, US."));
        assert!(report.social().is_none());

        let text = report.render();
        assert!(text.contains("SECTION: DNS RESOLUTION"));
        assert!(text.contains("SECTION: GEOLOCATION"));
        assert!(!text.contains("SECTION: SOCIAL MEDIA SEARCH"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ip_geo_timeout() {
        let calls = Calls::default();
        let dns = FakeDns {
            calls: calls.clone(),
            ..Default::default()
        };
        let geo = FakeGeo {
            record: Some(comcast_record()),
            hang: true,
            ..Default::default()
        };
        let investigator = investigator(dns, geo, FakeCheck::default());

        let report = investigator
            .run_operations(&target("8.8.8.8"), ops(&[Operation::Geo]))
            .await;

        assert_eq!(report.geo(), Some(&GeoResult::unknown(ip("8.8.8.8"))));
        assert!(report
            .summary()
            .key_findings
            .contains(&"Geolocation: no location data found.".to_string()));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_username_social() {
        let check = FakeCheck {
            found: vec!["facebook", "instagram", "reddit"],
        };
        let investigator = investigator(FakeDns::default(), FakeGeo::default(), check);

        let report = investigator
            .run_operations(&target("johndoe123"), ops(&[Operation::Social]))
            .await;

        let social = report.social().unwrap();
        assert_eq!(social.reachable_count(), 3);
        let names: Vec<_> = social.entries.iter().map(|e| e.platform.as_str()).collect();
        let declared: Vec<_> = SOCIAL_PLATFORMS.iter().map(|p| p.name).collect();
        assert_eq!(names, declared);
        assert!(report
            .summary()
            .key_findings
            .contains(&"Social media presence: 3 platform(s) with results.".to_string()));
        assert!(report.dns().is_none());
        assert!(report.geo().is_none());
    }

    #[tokio::test]
    async fn test_hostname_whois_uses_registrable_domain() {
        let asked = Calls::default();
        let whois = FakeWhois {
            raw: Some(EXAMPLE_WHOIS),
            asked: asked.clone(),
        };
        let investigator = with_whois(
            FakeDns::default(),
            FakeGeo::default(),
            FakeCheck::default(),
            whois,
        );

        let report = investigator
            .run_operations(&target("www.example.com"), ops(&[Operation::Whois]))
            .await;

        assert_eq!(*asked.lock().unwrap(), vec!["example.com".to_string()]);
        let whois = report.whois().unwrap();
        assert_eq!(whois.creation_date.as_deref(), Some("1995-08-14T04:00:00Z"));
        assert!(report.summary().key_findings.contains(
            &"Registrar: RESERVED-Internet Assigned Numbers Authority.".to_string()
        ));
        assert!(report.render().contains("SECTION: WHOIS INFORMATION"));
    }

    #[tokio::test]
    async fn test_whois_failure_and_username_skip() {
        let asked = Calls::default();
        let whois = FakeWhois {
            raw: None,
            asked: asked.clone(),
        };
        let investigator = with_whois(
            FakeDns::default(),
            FakeGeo::default(),
            FakeCheck::default(),
            whois,
        );

        let failed = investigator
            .run_operations(&target("example.com"), ops(&[Operation::Whois]))
            .await;
        assert!(!failed.whois().unwrap().has_data());
        assert!(failed.render().contains("WHOIS: No registration data available"));

        let skipped = investigator
            .run_operations(&target("johndoe123"), ops(&[Operation::Whois]))
            .await;
        assert!(skipped.whois().is_none());
        assert!(skipped.render().contains("WHOIS: Skipped"));
        assert_eq!(asked.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ip_target_dns_is_reverse_only() {
        let calls = Calls::default();
        let mut dns = FakeDns {
            calls: calls.clone(),
            ..Default::default()
        };
        dns.ptr.insert(ip("8.8.8.8"), "dns.google".to_string());
        let investigator = investigator(dns, FakeGeo::default(), FakeCheck::default());

        let report = investigator
            .run_operations(&target("8.8.8.8"), ops(&[Operation::Dns]))
            .await;

        assert_eq!(*calls.lock().unwrap(), vec!["PTR 8.8.8.8".to_string()]);
        assert_eq!(
            report.dns().unwrap().reverse_hostname.as_deref(),
            Some("dns.google")
        );
    }

    #[tokio::test]
    async fn test_unresolved_hostname_skips_geo() {
        let asked = Calls::default();
        let geo = FakeGeo {
            record: Some(comcast_record()),
            asked: asked.clone(),
            ..Default::default()
        };
        let investigator = investigator(FakeDns::default(), geo, FakeCheck::default());

        let report = investigator
            .run_operations(
                &target("nx.invalid-domain.com"),
                ops(&[Operation::Dns, Operation::Geo]),
            )
            .await;

        assert!(report.dns().unwrap().ips.is_empty());
        assert_eq!(report.geo_skipped(), Some(GeoSkipReason::NoDnsAddress));
        assert!(report.geo().is_none());
        assert!(asked.lock().unwrap().is_empty());
        assert!(report.render().contains("Geolocation: Skipped"));
    }

    #[tokio::test]
    async fn test_geo_without_dns_resolves_first() {
        let calls = Calls::default();
        let mut dns = FakeDns {
            calls: calls.clone(),
            ..Default::default()
        };
        dns.forward.insert(
            "www.example.com".to_string(),
            vec![ip("93.184.216.34"), ip("93.184.216.35")],
        );
        let asked = Calls::default();
        let geo = FakeGeo {
            record: Some(comcast_record()),
            asked: asked.clone(),
            ..Default::default()
        };
        let investigator = investigator(dns, geo, FakeCheck::default());

        let t = target("www.example.com");
        assert_eq!(
            investigator.geo_input(&t, None).await,
            GeoInput::Prerequisite(ip("93.184.216.34"))
        );

        let report = investigator.run_operations(&t, ops(&[Operation::Geo])).await;
        assert!(report.dns().is_none());
        assert_eq!(asked.lock().unwrap().len(), 1);
        assert!(!report.render().contains("SECTION: DNS RESOLUTION"));
        assert!(calls.lock().unwrap().iter().all(|c| c.starts_with("A ")));
    }

    #[tokio::test]
    async fn test_geo_input_branches() {
        let investigator = investigator(FakeDns::default(), FakeGeo::default(), FakeCheck::default());

        assert_eq!(
            investigator.geo_input(&target("1.1.1.1"), None).await,
            GeoInput::Direct(ip("1.1.1.1"))
        );
        assert_eq!(
            investigator.geo_input(&target("johndoe123"), None).await,
            GeoInput::Skipped(GeoSkipReason::NotNetworkTarget)
        );
        assert_eq!(
            investigator.geo_input(&target("example.com"), None).await,
            GeoInput::Skipped(GeoSkipReason::Unresolved)
        );

        let mut dns = DnsResult::empty("example.com");
        dns.ips = vec![ip("93.184.216.34")];
        assert_eq!(
            investigator.geo_input(&target("example.com"), Some(&dns)).await,
            GeoInput::FromDns(ip("93.184.216.34"))
        );
    }

    #[tokio::test]
    async fn test_report_is_repeatable() {
        let build = || {
            let mut dns = FakeDns::default();
            dns.forward
                .insert("example.com".to_string(), vec![ip("93.184.216.34")]);
            let geo = FakeGeo {
                record: Some(comcast_record()),
                ..Default::default()
            };
            let check = FakeCheck {
                found: vec!["reddit"],
            };
            investigator(dns, geo, check)
        };
        let strip = |text: String| -> Vec<String> {
            text.lines()
                .filter(|l| !l.starts_with("Generated:"))
                .map(str::to_string)
                .collect()
        };

        let first = build()
            .run_operations(&target("example.com"), OperationSet::all())
            .await;
        let second = build()
            .run_operations(&target("example.com"), OperationSet::all())
            .await;

        assert_eq!(strip(first.render()), strip(second.render()));
    }

    #[tokio::test]
    async fn test_execute_directive_saves_report() {
        let mut investigator = investigator(
            FakeDns::default(),
            FakeGeo::default(),
            FakeCheck {
                found: vec!["youtube"],
            },
        );
        let path = std::env::temp_dir().join(format!("quickosint-test-{}.txt", std::process::id()));
        let mut console = quiet_console();

        let report = investigator
            .execute(
                EntryMode::Directive {
                    target: "johndoe123".to_string(),
                    operations: ops(&[Operation::Social]),
                },
                &mut console,
                Some(&path),
            )
            .await
            .unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(saved, report.render());
        assert_eq!(String::from_utf8_lossy(console.output()), report.render());
        assert_eq!(investigator.phase(), Phase::Done);
        assert_eq!(
            report.social().unwrap().get("YouTube").unwrap().reachability,
            Reachability::Reachable
        );
    }

    #[tokio::test]
    async fn test_execute_empty_target_is_fatal() {
        let mut investigator = investigator(FakeDns::default(), FakeGeo::default(), FakeCheck::default());
        let mut console = quiet_console();

        let result = investigator
            .execute(
                EntryMode::Directive {
                    target: "   ".to_string(),
                    operations: OperationSet::all(),
                },
                &mut console,
                None,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(investigator.phase(), Phase::CollectingInput);
        assert!(console.output().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_after_print() {
        let mut investigator = investigator(FakeDns::default(), FakeGeo::default(), FakeCheck::default());
        let mut console = quiet_console();
        let path = std::env::temp_dir()
            .join("quickosint-missing-dir")
            .join("nested")
            .join("report.txt");

        let result = investigator
            .execute(
                EntryMode::Directive {
                    target: "johndoe123".to_string(),
                    operations: ops(&[Operation::Social]),
                },
                &mut console,
                Some(&path),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(investigator.phase(), Phase::Reporting);
        let printed = String::from_utf8_lossy(console.output()).into_owned();
        assert!(printed.contains("END OF REPORT"));
    }

    #[tokio::test]
    async fn test_execute_interactive_prompts() {
        let mut dns = FakeDns::default();
        dns.forward
            .insert("example.com".to_string(), vec![ip("93.184.216.34")]);
        let mut investigator = investigator(dns, FakeGeo::default(), FakeCheck::default());
        let input = "\nexample.com\n1\n";
        let mut console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());

        let report = investigator
            .execute(
                EntryMode::Interactive {
                    target: None,
                    operations: None,
                },
                &mut console,
                None,
            )
            .await
            .unwrap();

        assert_eq!(report.target().value(), "example.com");
        assert_eq!(report.operations(), OperationSet::web());
        assert!(report.dns().unwrap().is_resolved());
        assert_eq!(
            report.geo(),
            Some(&GeoResult::unknown(ip("93.184.216.34")))
        );
    }
}
