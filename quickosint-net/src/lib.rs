//! QuickOSINT Network Layer
//!
//! Lookups against external services, each behind a trait seam:
//! - DNS forward/reverse/NS resolution (hickory resolver)
//! - IP geolocation (ipinfo.io JSON API)
//! - Social media presence probes (plain HTTP GET)
//! - WHOIS registration records (port 43, via whois-rust)
//!
//! Every lookup is bounded by a timeout and recovers locally from failure.

pub mod client;
pub mod dns;
pub mod geo;
pub mod social;
pub mod whois;

pub use client::*;
pub use dns::*;
pub use geo::*;
pub use social::*;
pub use whois::*;
