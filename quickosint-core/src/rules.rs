//! Proxy/CDN and datacenter detection rules
//!
//! Rules are plain marker lists loaded from TOML so the classifier can be
//! extended without touching code. The default table is embedded from
//! `rules/network.toml`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::CoreError;

const EMBEDDED_RULES: &str = include_str!("../rules/network.toml");

/// Substring markers for classifying a network owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRules {
    /// Markers of reverse proxies and CDN edges
    #[serde(default)]
    pub proxy: Vec<String>,
    /// Markers of hosting providers and cloud datacenters
    #[serde(default)]
    pub datacenter: Vec<String>,
}

/// Flags derived from a set of rules. `None` means nothing was available to match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkFlags {
    pub is_proxy: Option<bool>,
    pub is_datacenter: Option<bool>,
}

impl DetectionRules {
    /// The rule table shipped with the binary
    pub fn embedded() -> Self {
        Self::from_toml_str(EMBEDDED_RULES).expect("embedded detection rules must parse")
    }

    /// Parse rules from TOML text; markers are lowercased and blanks dropped
    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let rules: Self =
            toml::from_str(content).map_err(|e| CoreError::InvalidRules(e.to_string()))?;
        Ok(rules.normalized())
    }

    /// Load rules from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn normalized(self) -> Self {
        fn clean(markers: Vec<String>) -> Vec<String> {
            markers
                .into_iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect()
        }
        Self {
            proxy: clean(self.proxy),
            datacenter: clean(self.datacenter),
        }
    }

    /// Match organization and hostname strings against the markers
    pub fn classify(&self, org: Option<&str>, hostname: Option<&str>) -> NetworkFlags {
        let haystacks: Vec<String> = [org, hostname]
            .into_iter()
            .flatten()
            .map(str::to_lowercase)
            .collect();

        if haystacks.is_empty() {
            return NetworkFlags::default();
        }

        NetworkFlags {
            is_proxy: Some(matches_any(&self.proxy, &haystacks)),
            is_datacenter: Some(matches_any(&self.datacenter, &haystacks)),
        }
    }
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self::embedded()
    }
}

fn matches_any(markers: &[String], haystacks: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| haystacks.iter().any(|h| h.contains(marker.as_str())))
}
