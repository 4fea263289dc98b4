//! PubMed efetch XML parsing.
//!
//! Turns a `PubmedArticleSet` document into [`Paper`]s, keeping only articles
//! with at least one non-academic author. Problems with a single article are
//! logged and that article is skipped; they never abort the batch.

use crate::classifier::is_non_academic;
use crate::models::{Author, Paper};
use crate::xml::{BrokenElement, Element, Elements};
use chrono::Month;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, error, warn};

/// Title used when an article has none
pub const NO_TITLE: &str = "No title available";

/// Date used when neither PubDate nor MedlineDate yields anything
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Name used when an author entry carries no name fields at all
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("email pattern must compile"));

/// Root element of an efetch response
pub const ARTICLE_SET: &str = "PubmedArticleSet";

/// Parse an efetch response, returning the papers that pass the industry filter.
pub fn parse_article_set(xml: &str) -> Vec<Paper> {
    let mut papers = Vec::new();
    let mut elements = Elements::new(xml, "PubmedArticle");

    for item in elements.by_ref() {
        match item {
            Ok(article) => {
                if let Some(paper) = parse_article(&article) {
                    papers.push(paper);
                }
            }
            Err(BrokenElement {
                partial: Some(partial),
                error: e,
            }) => {
                let pmid = partial
                    .find("PMID")
                    .and_then(Element::non_empty_text)
                    .unwrap_or_else(|| "unknown".to_string());
                error!(pmid = %pmid, error = %e, "Error parsing article");
            }
            Err(BrokenElement { partial: None, error: e }) => {
                error!(error = %e, "Error parsing XML response");
            }
        }
    }

    if let Some(problem) = response_shape_problem(xml, elements.root()) {
        warn!(problem = %problem, "Unexpected efetch response format");
    }

    papers
}

/// Describe what is wrong with a non-empty response whose root is not
/// `PubmedArticleSet`.
fn response_shape_problem(xml: &str, root: Option<&str>) -> Option<String> {
    if xml.trim().is_empty() {
        return None;
    }
    match root {
        Some(ARTICLE_SET) => None,
        Some(other) => Some(format!("expected <{}>, found <{}>", ARTICLE_SET, other)),
        None => Some("response contains no XML elements".to_string()),
    }
}

/// Parse one `PubmedArticle` element.
///
/// Returns `None` when the PMID is missing or no author is non-academic.
pub fn parse_article(article: &Element) -> Option<Paper> {
    let Some(pubmed_id) = article.find("PMID").and_then(Element::non_empty_text) else {
        warn!("Article missing PMID, skipping");
        return None;
    };

    let title = article
        .find("ArticleTitle")
        .and_then(Element::non_empty_text)
        .unwrap_or_else(|| NO_TITLE.to_string());

    let publication_date = extract_publication_date(article);
    let authors = extract_authors(article);

    let non_academic_authors: Vec<Author> = authors
        .iter()
        .filter(|a| is_non_academic(&a.affiliation))
        .cloned()
        .collect();

    if non_academic_authors.is_empty() {
        debug!(pmid = %pubmed_id, "No non-academic authors found, skipping");
        return None;
    }

    Some(Paper {
        pubmed_id,
        title,
        publication_date,
        authors,
        non_academic_authors,
    })
}

/// Normalize the publication date to `YYYY-MM-DD`, `YYYY-MM` or `YYYY`,
/// falling back to MedlineDate and then [`UNKNOWN_DATE`].
pub fn extract_publication_date(article: &Element) -> String {
    if let Some(pub_date) = article.find("PubDate") {
        let field = |name: &str| pub_date.child(name).map(Element::text).unwrap_or_default();
        if let Some(date) = format_date(&field("Year"), &field("Month"), &field("Day")) {
            return date;
        }
    }

    article
        .find("MedlineDate")
        .and_then(Element::non_empty_text)
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Combine year/month/day parts at the finest granularity available.
fn format_date(year: &str, month: &str, day: &str) -> Option<String> {
    if year.is_empty() {
        return None;
    }

    let month = normalize_month(month);
    let day = day.trim();

    Some(match month {
        Some(m) if !day.is_empty() => format!("{}-{}-{:0>2}", year, m, day),
        Some(m) => format!("{}-{}", year, m),
        None => year.to_string(),
    })
}

/// Numeric months are zero-padded; month names are read from their first
/// three letters. Anything else is dropped.
fn normalize_month(month: &str) -> Option<String> {
    let month = month.trim();
    if month.is_empty() {
        return None;
    }

    if month.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("{:0>2}", month));
    }

    if month.chars().all(char::is_alphabetic) {
        let abbrev: String = month.chars().take(3).collect();
        return abbrev
            .parse::<Month>()
            .ok()
            .map(|m| format!("{:02}", m.number_from_month()));
    }

    None
}

/// Build the author list, including the corresponding-author fallback.
pub fn extract_authors(article: &Element) -> Vec<Author> {
    let Some(author_list) = article.find("AuthorList") else {
        return Vec::new();
    };

    let mut authors: Vec<Author> = author_list.children("Author").map(parse_author).collect();

    if !authors.is_empty() && !authors.iter().any(|a| a.is_corresponding) {
        infer_corresponding(article, &mut authors);
    }

    authors
}

fn parse_author(author: &Element) -> Author {
    let affiliation = extract_affiliation(author);
    let email = find_email(&affiliation);

    let flagged = |attr: &str| {
        author
            .attr(attr)
            .is_some_and(|v| v.eq_ignore_ascii_case("yes"))
    };
    let is_corresponding = email.is_some() || flagged("EqualContrib") || flagged("CorrespAuthor");

    Author {
        name: author_name(author),
        affiliation,
        email,
        is_corresponding,
    }
}

/// "Family Given", "Family Initials", the collective name, or [`UNKNOWN_AUTHOR`].
pub fn author_name(author: &Element) -> String {
    let text = |name: &str| author.child(name).and_then(Element::non_empty_text);

    let given = text("ForeName").or_else(|| text("Initials"));
    let parts: Vec<String> = text("LastName").into_iter().chain(given).collect();

    if !parts.is_empty() {
        return parts.join(" ");
    }

    text("CollectiveName").unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

/// `AffiliationInfo/Affiliation` first, then the legacy direct `Affiliation`.
pub fn extract_affiliation(author: &Element) -> String {
    author
        .descendants()
        .filter(|e| e.name() == "AffiliationInfo")
        .find_map(|info| info.child("Affiliation"))
        .and_then(Element::non_empty_text)
        .or_else(|| author.child("Affiliation").and_then(Element::non_empty_text))
        .unwrap_or_default()
}

/// First email-like substring, without the sentence-ending period PubMed
/// affiliations usually carry.
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

/// With no author marked, use the article's correspondence note, or default
/// the first author to corresponding.
fn infer_corresponding(article: &Element, authors: &mut [Author]) {
    let Some(first) = authors.first_mut() else {
        return;
    };

    match article.find("Correspondence").and_then(Element::non_empty_text) {
        Some(note) => {
            if let Some(email) = find_email(&note) {
                first.email = Some(email);
                first.is_corresponding = true;
            }
        }
        None => first.is_corresponding = true,
    }
}
