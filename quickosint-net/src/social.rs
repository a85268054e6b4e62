//! Social media presence probing
//!
//! Substitutes a sanitized query into every platform URL template and issues
//! one unauthenticated GET per platform. A platform that errors or times out
//! is marked unreachable; the batch always covers every platform.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use quickosint_core::{sanitize_query, Reachability, SocialEntry, SocialResult, SOCIAL_PLATFORMS};

use crate::{create_http_client, NetConfig, NetError};

/// Existence check for one URL
#[async_trait]
pub trait PresenceCheck: Send + Sync {
    /// HTTP status code returned for `url`
    async fn status(&self, url: &str) -> Result<u16, NetError>;
}

/// Plain HTTP GET check
pub struct HttpPresenceCheck {
    client: Client,
}

impl HttpPresenceCheck {
    pub fn new(config: &NetConfig) -> Result<Self, NetError> {
        Ok(Self {
            client: create_http_client(config, config.probe_timeout)?,
        })
    }
}

#[async_trait]
impl PresenceCheck for HttpPresenceCheck {
    async fn status(&self, url: &str) -> Result<u16, NetError> {
        let response = self.client.get(url).send().await?;
        Ok(response.status().as_u16())
    }
}

/// Probes the fixed platform table for a username
pub struct SocialProber {
    checker: Box<dyn PresenceCheck>,
    timeout: Duration,
}

impl SocialProber {
    pub fn new(checker: Box<dyn PresenceCheck>, timeout: Duration) -> Self {
        Self { checker, timeout }
    }

    /// Probe every platform in declaration order
    pub async fn probe(&self, username: &str) -> SocialResult {
        let query = sanitize_query(username);
        if query.is_empty() {
            info!("Query {:?} is empty after sanitizing; platforms not checked", username);
        }

        let mut entries = Vec::with_capacity(SOCIAL_PLATFORMS.len());
        for platform in SOCIAL_PLATFORMS {
            let url = platform.build_url(&query);
            let reachability = if query.is_empty() {
                Reachability::NotChecked
            } else {
                self.check(platform.name, &url).await
            };
            entries.push(SocialEntry {
                platform: platform.name.to_string(),
                url,
                reachability,
            });
        }

        let result = SocialResult { query, entries };
        info!(
            "Social media search: {}/{} platform(s) with results",
            result.reachable_count(),
            result.entries.len()
        );
        result
    }

    async fn check(&self, platform: &str, url: &str) -> Reachability {
        match tokio::time::timeout(self.timeout, self.checker.status(url)).await {
            Ok(Ok(200)) => Reachability::Reachable,
            Ok(Ok(status)) => {
                debug!("{} returned status {}", platform, status);
                Reachability::Unreachable
            }
            Ok(Err(e)) => {
                debug!("{} check failed: {}", platform, e);
                Reachability::Unreachable
            }
            Err(_) => {
                debug!("{} check timed out after {}s", platform, self.timeout.as_secs());
                Reachability::Unreachable
            }
        }
    }
}
