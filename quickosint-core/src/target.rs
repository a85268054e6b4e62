//! Investigation targets
//!
//! Classifies raw user input before any lookup runs:
//! - IPv4/IPv6 literals become `Ip` targets
//! - Two-label names (`example.com`) become `Domain` targets
//! - Longer names (`www.example.com`) become `Hostname` targets
//! - Anything else is treated as a `Username` (handles, real names)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::CoreError;

/// What kind of thing the user asked us to investigate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Fully qualified host below a registrable domain
    Hostname,
    /// Registrable domain (exactly two labels)
    Domain,
    /// IPv4 or IPv6 literal
    Ip,
    /// Social media handle or real name
    Username,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hostname => "hostname",
            Self::Domain => "domain",
            Self::Ip => "ip",
            Self::Username => "username",
        }
    }

    /// Whether DNS can resolve this kind forward to addresses
    pub fn is_network_name(&self) -> bool {
        matches!(self, Self::Hostname | Self::Domain)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static HOSTNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+(?:[A-Za-z]{2,63}|xn--[A-Za-z0-9-]{1,59})$").unwrap()
});

/// A classified investigation target. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationTarget {
    value: String,
    kind: TargetKind,
    ip: Option<IpAddr>,
}

impl InvestigationTarget {
    /// Classify a user-supplied string
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(CoreError::InvalidTarget("input cannot be empty".to_string()));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(CoreError::InvalidTarget(
                "input contains control characters".to_string(),
            ));
        }

        let literal = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed);
        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(Self {
                value: ip.to_string(),
                kind: TargetKind::Ip,
                ip: Some(ip),
            });
        }

        let name = trimmed.strip_suffix('.').unwrap_or(trimmed);
        if HOSTNAME_REGEX.is_match(name) {
            let kind = if name.split('.').count() == 2 {
                TargetKind::Domain
            } else {
                TargetKind::Hostname
            };
            return Ok(Self {
                value: name.to_ascii_lowercase(),
                kind,
                ip: None,
            });
        }

        Ok(Self {
            value: trimmed.to_string(),
            kind: TargetKind::Username,
            ip: None,
        })
    }

    /// Normalized target text (lowercased names, canonical IP form)
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// The address itself when the target is an IP literal
    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    /// `label.tld` parent of a hostname; `None` for every other kind
    pub fn registrable_parent(&self) -> Option<String> {
        if self.kind != TargetKind::Hostname {
            return None;
        }
        let labels: Vec<&str> = self.value.split('.').collect();
        let parent = &labels[labels.len().saturating_sub(2)..];
        Some(parent.join("."))
    }
}

impl FromStr for InvestigationTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for InvestigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ipv4() {
        let target = InvestigationTarget::parse("8.8.8.8").unwrap();
        assert_eq!(target.kind(), TargetKind::Ip);
        assert_eq!(target.ip(), Some("8.8.8.8".parse().unwrap()));
    }

    #[test]
    fn test_classify_ipv6() {
        let target = InvestigationTarget::parse("2001:4860:4860::8888").unwrap();
        assert_eq!(target.kind(), TargetKind::Ip);

        let bracketed = InvestigationTarget::parse("[::1]").unwrap();
        assert_eq!(bracketed.kind(), TargetKind::Ip);
        assert_eq!(bracketed.value(), "::1");
    }

    #[test]
    fn test_classify_domain_and_hostname() {
        let domain = InvestigationTarget::parse("Example.com").unwrap();
        assert_eq!(domain.kind(), TargetKind::Domain);
        assert_eq!(domain.value(), "example.com");

        let host = InvestigationTarget::parse("www.example.co.uk.").unwrap();
        assert_eq!(host.kind(), TargetKind::Hostname);
        assert_eq!(host.value(), "www.example.co.uk");
    }

    #[test]
    fn test_classify_username() {
        let handle = InvestigationTarget::parse("  johndoe123 ").unwrap();
        assert_eq!(handle.kind(), TargetKind::Username);
        assert_eq!(handle.value(), "johndoe123");

        let real_name = InvestigationTarget::parse("John Doe").unwrap();
        assert_eq!(real_name.kind(), TargetKind::Username);

        // Numeric TLDs are not hostnames
        let dotted = InvestigationTarget::parse("1.2.3").unwrap();
        assert_eq!(dotted.kind(), TargetKind::Username);
    }

    #[test]
    fn test_classify_punycode_tld() {
        let idn = InvestigationTarget::parse("example.xn--p1ai").unwrap();
        assert_eq!(idn.kind(), TargetKind::Domain);

        let host = InvestigationTarget::parse("www.xn--e1afmkfd.xn--p1ai").unwrap();
        assert_eq!(host.kind(), TargetKind::Hostname);
        assert_eq!(host.registrable_parent(), Some("xn--e1afmkfd.xn--p1ai".to_string()));
    }

    #[test]
    fn test_empty_target_rejected() {
        assert!(matches!(
            InvestigationTarget::parse(""),
            Err(CoreError::InvalidTarget(_))
        ));
        assert!(InvestigationTarget::parse("   \t").is_err());
        assert!(InvestigationTarget::parse("bad\u{7}name").is_err());
    }

    #[test]
    fn test_registrable_parent() {
        let host = InvestigationTarget::parse("mail.google.com").unwrap();
        assert_eq!(host.registrable_parent(), Some("google.com".to_string()));

        let domain = InvestigationTarget::parse("google.com").unwrap();
        assert_eq!(domain.registrable_parent(), None);
    }
}
