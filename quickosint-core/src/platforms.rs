//! Social media platform registry
//!
//! Provides the fixed, ordered list of platforms probed for a username,
//! each with a search URL template.

use serde::Serialize;

/// A social media platform with a search URL template
#[derive(Debug, Clone, Serialize)]
pub struct SocialPlatform {
    /// Human-readable name
    pub name: &'static str,
    /// URL template with {query} placeholder
    pub url_template: &'static str,
}

impl SocialPlatform {
    /// Build the search URL for an already sanitized query
    pub fn build_url(&self, query: &str) -> String {
        self.url_template
            .replace("{query}", &urlencoding::encode(query))
    }
}

/// Platforms in probe and report order
pub static SOCIAL_PLATFORMS: &[SocialPlatform] = &[
    SocialPlatform {
        name: "Facebook",
        url_template: "https://www.facebook.com/search/people/?q={query}",
    },
    SocialPlatform {
        name: "X (Twitter)",
        url_template: "https://x.com/search?q={query}&src=typed_query",
    },
    SocialPlatform {
        name: "Instagram",
        url_template: "https://www.instagram.com/explore/tags/{query}",
    },
    SocialPlatform {
        name: "LinkedIn",
        url_template: "https://www.linkedin.com/search/results/all/?keywords={query}",
    },
    SocialPlatform {
        name: "YouTube",
        url_template: "https://www.youtube.com/results?search_query={query}",
    },
    SocialPlatform {
        name: "Pinterest",
        url_template: "https://pinterest.com/search/pins/?q={query}",
    },
    SocialPlatform {
        name: "TikTok",
        url_template: "https://www.tiktok.com/search?q={query}",
    },
    SocialPlatform {
        name: "Reddit",
        url_template: "https://www.reddit.com/search/?q={query}",
    },
];

/// Strip everything except ASCII letters, digits and whitespace
pub fn sanitize_query(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}
