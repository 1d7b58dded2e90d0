//! Release channel lookups against the public OpenShift mirror.
//!
//! Each channel directory on the mirror carries a plain-text `release.txt`
//! whose `Name:` line holds the newest version published to that channel.

use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;

use crate::error::{AuditError, Result};

/// Default base URL for release channel directories.
pub const DEFAULT_MIRROR: &str = "https://mirror.openshift.com/pub/openshift-v4/clients/ocp";

/// Source of "latest release in channel" answers.
pub trait ReleaseFeed {
    /// Latest version string published to `channel` (e.g. `stable-4.12`).
    fn latest(&self, channel: &str) -> Result<String>;
}

/// Fetches `release.txt` files over HTTPS.
pub struct HttpReleaseFeed {
    client: Client,
    base_url: String,
}

impl HttpReleaseFeed {
    /// Create a feed for `base_url` with a 10-second timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Create a feed with a custom timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ocaudit/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the release file for `channel`.
    pub fn release_url(&self, channel: &str) -> String {
        format!("{}/{}/release.txt", self.base_url, channel)
    }

    fn fetch(&self, channel: &str) -> anyhow::Result<String> {
        let url = self.release_url(channel);
        tracing::debug!("fetching {}", url);

        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            anyhow::bail!("HTTP {} fetching {}", response.status(), url);
        }
        Ok(response.text()?)
    }
}

impl ReleaseFeed for HttpReleaseFeed {
    fn latest(&self, channel: &str) -> Result<String> {
        let body = self.fetch(channel).map_err(|e| AuditError::ReleaseFeed {
            channel: channel.to_string(),
            message: e.to_string(),
        })?;

        parse_release_name(&body).ok_or_else(|| AuditError::ReleaseFeed {
            channel: channel.to_string(),
            message: "no 'Name:' line in release.txt".to_string(),
        })
    }
}

/// Extract the version from the `Name:` line of a `release.txt` body.
pub fn parse_release_name(body: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^Name:\s+(\S+)").ok()?;
    re.captures(body).map(|c| c[1].to_string())
}

/// Feed that never answers; used when version lookups are disabled.
#[derive(Debug, Default)]
pub struct OfflineFeed;

impl ReleaseFeed for OfflineFeed {
    fn latest(&self, channel: &str) -> Result<String> {
        Err(AuditError::ReleaseFeed {
            channel: channel.to_string(),
            message: "release lookups are disabled".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const RELEASE_TXT: &str = "Client tools for OpenShift\n--------------------------\n\n\
Name:           4.12.45\n\
Digest:         sha256:0123456789abcdef\n\
Created:        2024-01-10T12:00:00Z\n";

    #[test]
    fn parses_name_line() {
        assert_eq!(parse_release_name(RELEASE_TXT).as_deref(), Some("4.12.45"));
    }

    #[test]
    fn missing_name_line() {
        assert_eq!(parse_release_name("Digest: sha256:abc\n"), None);
    }

    #[test]
    fn release_url_trims_trailing_slash() {
        let feed = HttpReleaseFeed::new("https://mirror.example.com/ocp/").unwrap();
        assert_eq!(
            feed.release_url("stable-4.12"),
            "https://mirror.example.com/ocp/stable-4.12/release.txt"
        );
    }

    #[test]
    fn fetches_latest_from_mirror() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/stable-4.12/release.txt");
            then.status(200).body(RELEASE_TXT);
        });

        let feed = HttpReleaseFeed::new(&server.base_url()).unwrap();
        assert_eq!(feed.latest("stable-4.12").unwrap(), "4.12.45");
        mock.assert();
    }

    #[test]
    fn http_error_is_feed_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/stable-9.9/release.txt");
            then.status(404);
        });

        let feed = HttpReleaseFeed::new(&server.base_url()).unwrap();
        let err = feed.latest("stable-9.9").unwrap_err();
        assert!(matches!(err, AuditError::ReleaseFeed { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn offline_feed_always_fails() {
        assert!(OfflineFeed.latest("stable").is_err());
    }
}
