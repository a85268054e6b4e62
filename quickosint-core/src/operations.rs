//! Investigation operations and selections

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// A single lookup the pipeline can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Dns,
    Geo,
    Social,
    Whois,
}

impl Operation {
    /// All operations in declaration (execution) order
    pub const ALL: [Operation; 4] = [
        Operation::Dns,
        Operation::Geo,
        Operation::Social,
        Operation::Whois,
    ];

    /// Short key used on the command line and in the custom menu
    pub fn key(&self) -> &'static str {
        match self {
            Self::Dns => "dns",
            Self::Geo => "geo",
            Self::Social => "social",
            Self::Whois => "whois",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dns => "DNS Resolution",
            Self::Geo => "Geolocation",
            Self::Social => "Social Media Search",
            Self::Whois => "WHOIS Lookup",
        }
    }

    /// Report section heading
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Dns => "DNS RESOLUTION",
            Self::Geo => "GEOLOCATION",
            Self::Social => "SOCIAL MEDIA SEARCH",
            Self::Whois => "WHOIS INFORMATION",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dns" => Ok(Self::Dns),
            "geo" => Ok(Self::Geo),
            "social" => Ok(Self::Social),
            "whois" => Ok(Self::Whois),
            other => Err(CoreError::UnknownOperation(other.to_string())),
        }
    }
}

/// De-duplicated set of selected operations, always iterated in declaration order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationSet {
    dns: bool,
    geo: bool,
    social: bool,
    #[serde(default)]
    whois: bool,
}

impl OperationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            dns: true,
            geo: true,
            social: true,
            whois: true,
        }
    }

    /// DNS + Geolocation
    pub fn web() -> Self {
        Self::from_iter([Operation::Dns, Operation::Geo])
    }

    pub fn insert(&mut self, op: Operation) {
        match op {
            Operation::Dns => self.dns = true,
            Operation::Geo => self.geo = true,
            Operation::Social => self.social = true,
            Operation::Whois => self.whois = true,
        }
    }

    pub fn with(mut self, op: Operation) -> Self {
        self.insert(op);
        self
    }

    pub fn contains(&self, op: Operation) -> bool {
        match op {
            Operation::Dns => self.dns,
            Operation::Geo => self.geo,
            Operation::Social => self.social,
            Operation::Whois => self.whois,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.dns || self.geo || self.social || self.whois)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Operation> {
        let set = *self;
        Operation::ALL.into_iter().filter(move |op| set.contains(*op))
    }

    /// Parse a comma-separated list such as `"dns, social"` or `"all"`.
    ///
    /// Returns the selection plus every entry that was not recognized.
    pub fn parse_list(input: &str) -> (Self, Vec<String>) {
        let mut set = Self::empty();
        let mut unknown = Vec::new();

        for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry.eq_ignore_ascii_case("all") {
                return (Self::all(), unknown);
            }
            match entry.parse::<Operation>() {
                Ok(op) => set.insert(op),
                Err(_) => unknown.push(entry.to_string()),
            }
        }

        (set, unknown)
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut set = Self::empty();
        for op in iter {
            set.insert(op);
        }
        set
    }
}

impl fmt::Display for OperationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.iter().map(|op| op.key()).collect();
        f.write_str(&keys.join(", "))
    }
}
