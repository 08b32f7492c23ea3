//! Release API client.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const API_BASE: &str = "https://api.github.com";

/// Errors from release fetching.
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// HTTP transport or decoding failure.
    #[error("release request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("release API returned {status} for {repo}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Repository the request was for.
        repo: String,
    },
}

/// One release as returned by the hosting API.
///
/// Every field is optional in practice; missing values degrade to empty
/// rather than failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Release {
    /// Git tag of the release.
    #[serde(default)]
    pub tag_name: String,
    /// Display name, often equal to the tag.
    #[serde(default)]
    pub name: Option<String>,
    /// ISO-8601 Z publication timestamp.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Free-form markdown body.
    #[serde(default)]
    pub body: Option<String>,
}

impl Release {
    /// Name to show in headings: the release name, falling back to the tag.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !self.tag_name.is_empty() => &self.tag_name,
            _ => "Unknown",
        }
    }
}

/// Blocking client for the hosting provider's release listing.
pub struct ReleaseClient {
    http: reqwest::blocking::Client,
    token: Option<String>,
}

impl ReleaseClient {
    /// Creates a client, optionally authenticating with a personal token.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(token: Option<String>) -> Result<Self, ChangelogError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("bughound/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, token })
    }

    /// Fetches the ordered release list for `repo` (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub fn fetch_releases(&self, repo: &str) -> Result<Vec<Release>, ChangelogError> {
        let url = format!("{API_BASE}/repos/{repo}/releases");
        info!("fetching releases from {url}");

        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChangelogError::Status {
                status: status.as_u16(),
                repo: repo.to_string(),
            });
        }

        let releases: Vec<Release> = response.json()?;
        info!("fetched {} releases", releases.len());
        Ok(releases)
    }
}

/// Keeps only releases newer than `since_version`.
///
/// Walks the ordered list and stops at the first release whose tag equals
/// the lower bound (leading `v` ignored on both sides) or whose tag is
/// missing, mirroring the API's newest-first ordering. Without a lower bound
/// the full list is returned.
#[must_use]
pub fn releases_since(releases: Vec<Release>, since_version: Option<&str>) -> Vec<Release> {
    let Some(since) = since_version else {
        return releases;
    };
    let since = since.trim_start_matches('v');

    let mut newer = Vec::new();
    for release in releases {
        let tag = release.tag_name.trim_start_matches('v');
        if tag.is_empty() || tag == since {
            break;
        }
        newer.push(release);
    }
    newer
}
