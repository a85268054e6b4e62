//! Executive summary derivation
//!
//! Pure text generation from whatever results are present. A line is only
//! produced from an operation that was selected and actually ran.

use serde::{Deserialize, Serialize};

use crate::{
    DnsResult, GeoResult, GeoSkipReason, InvestigationTarget, Operation, OperationSet,
    Reachability, SocialResult, WhoisResult,
};

/// Everything the summary is derived from
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub target: &'a InvestigationTarget,
    pub operations: OperationSet,
    pub dns: Option<&'a DnsResult>,
    pub geo: Option<&'a GeoResult>,
    pub geo_skipped: Option<GeoSkipReason>,
    pub social: Option<&'a SocialResult>,
    pub whois: Option<&'a WhoisResult>,
}

/// Synthesized findings plus recommended next actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub completed: Vec<Operation>,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ExecutiveSummary {
    pub fn derive(input: &SummaryInput<'_>) -> Self {
        let dns = input.dns.filter(|_| input.operations.contains(Operation::Dns));
        let geo = input.geo.filter(|_| input.operations.contains(Operation::Geo));
        let social = input
            .social
            .filter(|_| input.operations.contains(Operation::Social));
        let whois = input
            .whois
            .filter(|_| input.operations.contains(Operation::Whois));

        let completed = input
            .operations
            .iter()
            .filter(|op| match op {
                Operation::Dns => dns.is_some(),
                Operation::Geo => geo.is_some(),
                Operation::Social => social.is_some(),
                Operation::Whois => whois.is_some(),
            })
            .collect();

        let mut key_findings = Vec::new();

        if let Some(dns) = dns {
            dns_findings(dns, &mut key_findings);
        }

        if input.operations.contains(Operation::Geo) {
            match (geo, input.geo_skipped) {
                (Some(geo), _) => geo_findings(geo, &mut key_findings),
                (None, Some(reason)) => {
                    key_findings.push(format!("Geolocation: skipped ({}).", reason));
                }
                (None, None) => {}
            }
        }

        if let Some(social) = social {
            social_findings(social, &mut key_findings);
        }

        if let Some(whois) = whois {
            whois_findings(whois, &mut key_findings);
        } else if input.operations.contains(Operation::Whois) {
            key_findings.push("WHOIS: skipped (target is not a domain, hostname or IP address).".to_string());
        }

        let found_anything = dns.is_some_and(DnsResult::has_data)
            || geo.is_some_and(GeoResult::has_data)
            || social.is_some_and(SocialResult::has_data)
            || whois.is_some_and(WhoisResult::has_data);
        if !found_anything {
            key_findings.push(format!(
                "No public information was found for {}.",
                input.target.value()
            ));
        }

        let recommendations = recommendations(dns, geo, social, whois);

        Self {
            completed,
            key_findings,
            recommendations,
        }
    }

    /// Text of the "Operations completed" line
    pub fn completed_line(&self) -> String {
        if self.completed.is_empty() {
            return "Operations completed: none".to_string();
        }
        let labels: Vec<&str> = self.completed.iter().map(|op| op.label()).collect();
        format!("Operations completed: {}", labels.join(", "))
    }
}

fn dns_findings(dns: &DnsResult, out: &mut Vec<String>) {
    if let Some(ip) = dns.first_ip() {
        out.push(format!("Target resolved to IP: {}.", ip));
    }
    if dns.ips.len() > 1 {
        out.push(format!(
            "Additional addresses: {} more IP(s) returned by DNS.",
            dns.ips.len() - 1
        ));
    }
    if let Some(name) = &dns.reverse_hostname {
        out.push(format!("Reverse lookup: {}.", name));
    }
    if !dns.has_data() {
        out.push(format!("DNS resolution: no records found for {}.", dns.target));
    }
}

fn geo_findings(geo: &GeoResult, out: &mut Vec<String>) {
    if geo.is_proxy == Some(true) {
        // Edge location says nothing about the origin host
        match &geo.org {
            Some(org) => out.push(format!(
                "Proxy/CDN detected ({}): reported location reflects the edge network, not the origin host.",
                org
            )),
            None => out.push(
                "Proxy/CDN detected: reported location reflects the edge network, not the origin host."
                    .to_string(),
            ),
        }
    } else if geo.city.is_some() || geo.country.is_some() {
        if let Some(location) = geo.location_line() {
            out.push(format!("Physical location: {}.", location));
        }
    }

    if geo.is_datacenter == Some(true) {
        out.push("Network type: data center / hosting provider.".to_string());
    }

    if let Some(provider) = geo.provider_line() {
        out.push(format!("ISP/Provider: {}.", provider));
    }

    if !geo.has_location() {
        out.push("Geolocation: no location data found.".to_string());
    }
}

fn social_findings(social: &SocialResult, out: &mut Vec<String>) {
    let all_unchecked = !social.entries.is_empty()
        && social
            .entries
            .iter()
            .all(|e| e.reachability == Reachability::NotChecked);

    if all_unchecked {
        out.push("Social media presence: not checked (query is empty after sanitizing).".to_string());
        return;
    }

    match social.reachable_count() {
        0 => out.push("Social media presence: no results found.".to_string()),
        n => out.push(format!("Social media presence: {} platform(s) with results.", n)),
    }
}

fn whois_findings(whois: &WhoisResult, out: &mut Vec<String>) {
    if !whois.has_data() {
        out.push(format!("WHOIS: no registration data found for {}.", whois.query));
        return;
    }
    if let Some(registrar) = &whois.registrar {
        out.push(format!("Registrar: {}.", registrar));
    }
    if let Some(org) = &whois.organization {
        out.push(format!("Registered to: {}.", org));
    }
    match (&whois.creation_date, &whois.expiration_date) {
        (Some(created), Some(expires)) => {
            out.push(format!("Registration: created {}, expires {}.", created, expires))
        }
        (Some(created), None) => out.push(format!("Registration: created {}.", created)),
        (None, Some(expires)) => out.push(format!("Registration: expires {}.", expires)),
        (None, None) => {}
    }
}

fn recommendations(
    dns: Option<&DnsResult>,
    geo: Option<&GeoResult>,
    social: Option<&SocialResult>,
    whois: Option<&WhoisResult>,
) -> Vec<String> {
    let mut recs = vec!["Verify all information through multiple sources.".to_string()];

    if dns.is_some() {
        recs.push("Cross-reference DNS records with WHOIS registration data.".to_string());
    }
    if let Some(geo) = geo {
        recs.push(
            "Cross-reference geolocation data with WHOIS records; IP geolocation is approximate."
                .to_string(),
        );
        if geo.is_proxy == Some(true) {
            recs.push(
                "Identify the origin host behind the proxy/CDN (historical DNS, certificate transparency) before drawing location conclusions."
                    .to_string(),
            );
        }
    }
    if social.is_some() {
        recs.push("Monitor social media platforms regularly for new activity.".to_string());
        recs.push(
            "Review matched platforms manually; search pages may return unrelated accounts."
                .to_string(),
        );
    }

    if whois.is_some() {
        recs.push(
            "Compare registration dates and registrar with historical WHOIS data to spot recent transfers."
                .to_string(),
        );
    }

    recs.push("Use a VPN or anonymity tools when conducting OSINT investigations.".to_string());
    recs.push("Consider legal compliance when using this information.".to_string());
    recs
}
