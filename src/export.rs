//! CSV export of filtered papers.

use crate::error::Result;
use crate::models::Paper;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// CSV column order
pub const COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// One output row, in [`COLUMNS`] order
#[derive(Debug, Serialize)]
struct Row<'a> {
    pubmed_id: &'a str,
    title: &'a str,
    publication_date: &'a str,
    non_academic_authors: String,
    company_affiliations: String,
    corresponding_author_email: &'a str,
}

impl<'a> From<&'a Paper> for Row<'a> {
    fn from(paper: &'a Paper) -> Self {
        Row {
            pubmed_id: &paper.pubmed_id,
            title: &paper.title,
            publication_date: &paper.publication_date,
            non_academic_authors: paper
                .non_academic_authors
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            company_affiliations: paper.company_affiliations().join("; "),
            corresponding_author_email: paper.corresponding_author_email().unwrap_or(""),
        }
    }
}

/// Write the header and one row per paper to `writer`.
pub fn write_csv<W: std::io::Write>(writer: W, papers: &[Paper]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(COLUMNS)?;
    for paper in papers {
        wtr.serialize(Row::from(paper))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Render papers as a CSV string. Zero papers yields the header line only.
pub fn to_csv(papers: &[Paper]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, papers)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Save papers as CSV at `path`.
pub fn save_csv(path: &Path, papers: &[Paper]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), papers)?;
    info!(path = %path.display(), rows = papers.len(), "Saved CSV");
    Ok(())
}
