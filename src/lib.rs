//! # pubmed_papers
//!
//! Find PubMed papers with at least one author from a pharmaceutical or
//! biotech company, and export them as CSV.
//!
//! ## Modules
//!
//! - [`pubmed`] - E-utilities search/fetch client
//! - [`parser`] - PubmedArticle XML to [`Paper`] extraction
//! - [`classifier`] - Academic vs. industry affiliation heuristics
//! - [`export`] - CSV output
//! - [`config`] - Client settings
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pubmed_papers::{config::ClientConfig, export, pubmed::PubMedClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PubMedClient::new(ClientConfig::default())?;
//!     let papers = client.get_papers("cancer immunotherapy").await;
//!     print!("{}", export::to_csv(&papers)?);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod parser;
pub mod pubmed;
pub mod xml;

pub use error::{PapersError, Result};
pub use models::{Author, Paper};
