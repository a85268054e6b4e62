//! Investigation report
//!
//! A report is assembled incrementally through [`ReportBuilder`] while the
//! lookups run, then frozen by [`ReportBuilder::build`], which derives the
//! executive summary. Rendering is deterministic apart from the timestamp.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{
    CoreError, DnsResult, ExecutiveSummary, GeoResult, GeoSkipReason, InvestigationTarget,
    Operation, OperationSet, Reachability, SocialResult, SummaryInput, TargetKind, WhoisResult,
    REPORT_WIDTH,
};

/// Finished investigation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationReport {
    target: InvestigationTarget,
    operations: OperationSet,
    dns: Option<DnsResult>,
    geo: Option<GeoResult>,
    geo_skipped: Option<GeoSkipReason>,
    social: Option<SocialResult>,
    whois: Option<WhoisResult>,
    summary: ExecutiveSummary,
    generated_at: DateTime<Local>,
}

/// Collects results as each operation completes
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    target: InvestigationTarget,
    operations: OperationSet,
    dns: Option<DnsResult>,
    geo: Option<GeoResult>,
    geo_skipped: Option<GeoSkipReason>,
    social: Option<SocialResult>,
    whois: Option<WhoisResult>,
    generated_at: Option<DateTime<Local>>,
}

impl ReportBuilder {
    pub fn dns(mut self, result: DnsResult) -> Self {
        self.dns = Some(result);
        self
    }

    pub fn geo(mut self, result: GeoResult) -> Self {
        self.geo = Some(result);
        self.geo_skipped = None;
        self
    }

    pub fn geo_skipped(mut self, reason: GeoSkipReason) -> Self {
        self.geo = None;
        self.geo_skipped = Some(reason);
        self
    }

    pub fn social(mut self, result: SocialResult) -> Self {
        self.social = Some(result);
        self
    }

    pub fn whois(mut self, result: WhoisResult) -> Self {
        self.whois = Some(result);
        self
    }

    /// Fix the timestamp instead of using the build time
    pub fn generated_at(mut self, at: DateTime<Local>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Freeze the report and derive its executive summary
    pub fn build(self) -> InvestigationReport {
        let summary = ExecutiveSummary::derive(&SummaryInput {
            target: &self.target,
            operations: self.operations,
            dns: self.dns.as_ref(),
            geo: self.geo.as_ref(),
            geo_skipped: self.geo_skipped,
            social: self.social.as_ref(),
            whois: self.whois.as_ref(),
        });

        InvestigationReport {
            target: self.target,
            operations: self.operations,
            dns: self.dns,
            geo: self.geo,
            geo_skipped: self.geo_skipped,
            social: self.social,
            whois: self.whois,
            summary,
            generated_at: self.generated_at.unwrap_or_else(Local::now),
        }
    }
}

impl InvestigationReport {
    pub fn builder(target: InvestigationTarget, operations: OperationSet) -> ReportBuilder {
        ReportBuilder {
            target,
            operations,
            dns: None,
            geo: None,
            geo_skipped: None,
            social: None,
            whois: None,
            generated_at: None,
        }
    }

    pub fn target(&self) -> &InvestigationTarget {
        &self.target
    }

    pub fn operations(&self) -> OperationSet {
        self.operations
    }

    pub fn dns(&self) -> Option<&DnsResult> {
        self.dns.as_ref()
    }

    pub fn geo(&self) -> Option<&GeoResult> {
        self.geo.as_ref()
    }

    pub fn geo_skipped(&self) -> Option<GeoSkipReason> {
        self.geo_skipped
    }

    pub fn social(&self) -> Option<&SocialResult> {
        self.social.as_ref()
    }

    pub fn whois(&self) -> Option<&WhoisResult> {
        self.whois.as_ref()
    }

    pub fn summary(&self) -> &ExecutiveSummary {
        &self.summary
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    /// Render the plain-text report
    pub fn render(&self) -> String {
        let heavy = "=".repeat(REPORT_WIDTH);
        let light = "-".repeat(REPORT_WIDTH);
        let mut lines: Vec<String> = Vec::new();

        lines.push(heavy.clone());
        lines.push("OSINT INFORMATION GATHERING REPORT".to_string());
        lines.push(format!("Target: {}", self.target));
        lines.push(format!(
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        for op in Operation::ALL {
            let state = if self.ran(op) {
                "completed"
            } else if self.operations.contains(op) {
                "skipped"
            } else {
                "not run"
            };
            lines.push(format!("  {:<22}{}", op.label(), state));
        }
        lines.push(heavy.clone());

        for op in self.operations.iter() {
            let body = match op {
                Operation::Dns => self.dns.as_ref().map(|dns| self.dns_section(dns)),
                Operation::Geo => self.geo_section(),
                Operation::Social => self.social.as_ref().map(social_section),
                Operation::Whois => Some(match &self.whois {
                    Some(whois) => whois_section(whois),
                    None => vec![
                        "WHOIS: Skipped (target is not a domain, hostname or IP address)".to_string(),
                    ],
                }),
            };
            if let Some(body) = body {
                lines.push(String::new());
                lines.push(light.clone());
                lines.push(format!("SECTION: {}", op.heading()));
                lines.push(light.clone());
                lines.extend(body);
            }
        }

        lines.push(String::new());
        lines.push(heavy.clone());
        lines.push("EXECUTIVE SUMMARY".to_string());
        lines.push(heavy.clone());
        lines.push(format!("- {}", self.summary.completed_line()));
        lines.push(String::new());
        lines.push("Key Findings:".to_string());
        lines.extend(self.summary.key_findings.iter().map(|f| format!("- {}", f)));
        lines.push(String::new());
        lines.push("Recommendations:".to_string());
        lines.extend(
            self.summary
                .recommendations
                .iter()
                .map(|r| format!("- {}", r)),
        );

        lines.push(String::new());
        lines.push(heavy.clone());
        lines.push("END OF REPORT".to_string());
        lines.push(heavy);

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Write the rendered report to `path`, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CoreError> {
        let path = path.as_ref();
        std::fs::write(path, self.render()).map_err(|source| CoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn ran(&self, op: Operation) -> bool {
        self.operations.contains(op)
            && match op {
                Operation::Dns => self.dns.is_some(),
                Operation::Geo => self.geo.is_some(),
                Operation::Social => self.social.is_some(),
                Operation::Whois => self.whois.is_some(),
            }
    }

    fn dns_section(&self, dns: &DnsResult) -> Vec<String> {
        let mut lines = Vec::new();

        if self.target.kind() == TargetKind::Ip {
            lines.push(format!("Target IP: {}", dns.target));
            lines.push(format!(
                "Reverse Lookup: {}",
                dns.reverse_hostname.as_deref().unwrap_or("No PTR record")
            ));
            return lines;
        }

        lines.push(format!("Hostname/IP: {}", dns.target));
        if !dns.is_resolved() {
            lines.push("DNS Resolution: Failed (no addresses found)".to_string());
        } else {
            let ips: Vec<String> = dns.ips.iter().map(|ip| ip.to_string()).collect();
            lines.push(format!("Resolved IP Address: {}", ips[0]));
            if ips.len() > 1 {
                lines.push(format!("All Addresses: {}", ips.join(", ")));
            }
            if let Some(name) = &dns.reverse_hostname {
                lines.push(format!("Reverse Lookup: {}", name));
            }
        }
        if let Some(servers) = &dns.name_servers {
            lines.push(format!("Name Servers: {}", servers.join(", ")));
        }
        lines
    }

    fn geo_section(&self) -> Option<Vec<String>> {
        if let Some(reason) = self.geo_skipped {
            return Some(vec![format!("Geolocation: Skipped ({})", reason)]);
        }
        let geo = self.geo.as_ref()?;
        let mut lines = Vec::new();

        if let Some(ip) = geo.ip {
            lines.push(format!("IP Address: {}", ip));
        }
        if !geo.has_data() {
            lines.push("Geolocation: No data available".to_string());
            return Some(lines);
        }

        let fields = [
            ("Hostname", &geo.hostname),
            ("City", &geo.city),
            ("Region", &geo.region),
            ("Country", &geo.country),
            ("Postal Code", &geo.postal),
            ("Timezone", &geo.timezone),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                lines.push(format!("{}: {}", label, value));
            }
        }
        if let Some((lat, lon)) = geo.coordinates() {
            lines.push(format!("Coordinates: Latitude {}, Longitude {}", lat, lon));
        }
        if let Some(org) = &geo.org {
            lines.push(format!("ISP/Org: {}", org));
        }
        if let Some(asn) = &geo.asn {
            lines.push(format!("ASN: {}", asn));
        }

        let detection = match (geo.is_proxy, geo.is_datacenter) {
            (Some(true), _) => "Proxy/CDN detected",
            (_, Some(true)) => "Data center IP detected",
            (Some(false), Some(false)) => "No proxy or data center markers",
            _ => "Unknown",
        };
        lines.push(format!("Detection: {}", detection));

        Some(lines)
    }
}

fn social_section(social: &SocialResult) -> Vec<String> {
    let mut lines = vec![format!("Query: {}", social.query), String::new()];

    for entry in &social.entries {
        lines.push(match entry.reachability {
            Reachability::Reachable => format!("✓ {}: {}", entry.platform, entry.url),
            Reachability::Unreachable => format!("✗ {}: No results found", entry.platform),
            Reachability::NotChecked => format!("- {}: Not checked", entry.platform),
        });
    }

    lines.push(String::new());
    lines.push(format!("Total Platforms Checked: {}", social.entries.len()));
    lines.push(format!("Platforms with Results: {}", social.reachable_count()));
    lines
}

fn whois_section(whois: &WhoisResult) -> Vec<String> {
    let mut lines = vec![format!("Query: {}", whois.query)];

    if !whois.has_data() {
        lines.push("WHOIS: No registration data available".to_string());
        return lines;
    }

    let unknown = |value: &Option<String>| value.clone().unwrap_or_else(|| "Unknown".to_string());
    lines.push(format!("Domain Name: {}", unknown(&whois.domain_name)));
    lines.push(format!("Registrar: {}", unknown(&whois.registrar)));
    if let Some(org) = &whois.organization {
        lines.push(format!("Organization: {}", org));
    }
    lines.push(format!("Creation Date: {}", unknown(&whois.creation_date)));
    lines.push(format!("Expiration Date: {}", unknown(&whois.expiration_date)));
    lines.push(format!("Updated Date: {}", unknown(&whois.updated_date)));
    if !whois.name_servers.is_empty() {
        lines.push(format!("Name Servers: {}", whois.name_servers.join(", ")));
    }
    if !whois.status.is_empty() {
        lines.push(format!("Status: {}", whois.status.join(", ")));
    }
    lines
}

impl fmt::Display for InvestigationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
