//! Client configuration for the NCBI E-utilities endpoints.

use crate::error::{PapersError, Result};
use std::time::Duration;
use url::Url;

/// Default E-utilities base URL (trailing slash required for `Url::join`)
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";

/// Default cap on search results
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Identifiers per efetch request
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Tool name reported to NCBI when none is configured
pub const DEFAULT_TOOL: &str = "pubmed-papers";

/// Settings for [`crate::pubmed::PubMedClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// E-utilities base URL
    pub base_url: String,
    /// `retmax` sent to esearch
    pub max_results: usize,
    /// Identifiers per efetch call
    pub batch_size: usize,
    /// Per-request timeout
    pub timeout: Duration,
    /// NCBI API key (raises the rate limit from 3 to 10 req/s)
    pub api_key: Option<String>,
    /// Contact email NCBI asks clients to send
    pub email: Option<String>,
    /// Tool name NCBI asks clients to send
    pub tool: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: Duration::from_secs(30),
            api_key: None,
            email: None,
            tool: DEFAULT_TOOL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Check the settings and return the parsed base URL.
    pub fn validate(&self) -> Result<Url> {
        if self.batch_size == 0 {
            return Err(PapersError::Config("batch size must be at least 1".to_string()));
        }

        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Url::parse(&base)
            .map_err(|e| PapersError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))
    }

    /// Identification parameters appended to every request.
    pub(crate) fn identity_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", self.tool.clone())];
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            params.push(("email", email.to_string()));
        }
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            params.push(("api_key", key.to_string()));
        }
        params
    }
}
