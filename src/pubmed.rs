//! NCBI E-utilities client for PubMed.
//!
//! `esearch` turns a query into PMIDs, `efetch` pulls the full records in
//! batches. Requests are issued one at a time.
//!
//! Transport failures and malformed responses are logged and treated as
//! empty results; a failed batch does not stop the ones after it.

use crate::config::ClientConfig;
use crate::error::{OptionExt, PapersError, Result};
use crate::models::Paper;
use crate::parser::parse_article_set;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use url::Url;

/// PubMed client with a shared HTTP connection pool
pub struct PubMedClient {
    client: Client,
    config: ClientConfig,
    search_url: Url,
    fetch_url: Url,
}

// === esearch JSON response ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: Option<ESearchResult>,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    count: Option<String>,
    idlist: Option<Vec<String>>,
}

impl PubMedClient {
    /// Create a new client from `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base = config.validate()?;
        let join = |endpoint: &str| {
            base.join(endpoint)
                .map_err(|e| PapersError::Config(format!("Invalid endpoint {}: {}", endpoint, e)))
        };
        let search_url = join("esearch.fcgi")?;
        let fetch_url = join("efetch.fcgi")?;

        let client = Client::builder()
            .user_agent(format!("{}/{}", config.tool, env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| PapersError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            search_url,
            fetch_url,
        })
    }

    /// Search PubMed and return up to `max_results` PMIDs.
    ///
    /// Errors are logged and produce an empty list.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<String> {
        debug!(query = query, max_results = max_results, "Searching PubMed");

        match self.try_search(query, max_results).await {
            Ok(ids) => {
                debug!(count = ids.len(), "Search returned identifiers");
                ids
            }
            Err(PapersError::Parse(msg)) => {
                warn!(reason = %msg, "No search results found or unexpected API response format");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Error searching PubMed");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", max_results.to_string()),
        ];
        params.extend(self.config.identity_params());

        let body = self.get_text(self.search_url.clone(), &params).await?;
        parse_search_response(&body)
    }

    /// Fetch full records for `ids`, `batch_size` at a time, keeping input order.
    pub async fn fetch(&self, ids: &[String]) -> Vec<Paper> {
        if ids.is_empty() {
            return Vec::new();
        }

        let batch_count = ids.len().div_ceil(self.config.batch_size);
        debug!(total = ids.len(), batches = batch_count, "Fetching paper details");

        let mut papers = Vec::new();
        for (batch_idx, chunk) in ids.chunks(self.config.batch_size).enumerate() {
            match self.fetch_batch(chunk).await {
                Ok(batch) => {
                    debug!(
                        batch = batch_idx + 1,
                        total_batches = batch_count,
                        requested = chunk.len(),
                        kept = batch.len(),
                        "Batch completed"
                    );
                    papers.extend(batch);
                }
                Err(e) => {
                    error!(batch = batch_idx + 1, error = %e, "Error fetching paper details");
                }
            }
        }

        papers
    }

    async fn fetch_batch(&self, ids: &[String]) -> Result<Vec<Paper>> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        params.extend(self.config.identity_params());

        let xml = self.get_text(self.fetch_url.clone(), &params).await?;
        Ok(parse_article_set(&xml))
    }

    /// Search, fetch, and keep only papers with a non-academic author.
    pub async fn get_papers(&self, query: &str) -> Vec<Paper> {
        let ids = self.search(query, self.config.max_results).await;
        let papers = self.fetch(&ids).await;

        info!(count = papers.len(), "Found papers with non-academic authors");
        papers
    }

    async fn get_text(&self, url: Url, params: &[(&str, String)]) -> Result<String> {
        debug!(url = %url, "Requesting");

        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PapersError::Api {
                code: status.as_u16(),
                message: format!("E-utilities error: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

/// Pull the PMID list out of an esearch JSON body.
fn parse_search_response(body: &str) -> Result<Vec<String>> {
    let data: ESearchResponse = serde_json::from_str(body)
        .map_err(|e| PapersError::Parse(format!("Failed to parse esearch response: {}", e)))?;

    let result = data.esearchresult.ok_or_parse("missing esearchresult")?;
    if let Some(count) = &result.count {
        debug!(count = %count, "Total matching papers");
    }

    result.idlist.ok_or_parse("missing idlist")
}
