//! Paper and author records produced by the parser.

use serde::Serialize;
use std::collections::HashSet;

/// An author as listed on a PubMed article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    /// "Family Given", "Family Initials", collective name, or "Unknown Author"
    pub name: String,
    /// First affiliation, empty when none is listed
    pub affiliation: String,
    /// Email found inside the affiliation text
    pub email: Option<String>,
    pub is_corresponding: bool,
}

/// A PubMed article with at least one non-academic author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    pub pubmed_id: String,
    pub title: String,
    /// `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, a MedlineDate string, or "Unknown date"
    pub publication_date: String,
    /// All authors in source order
    pub authors: Vec<Author>,
    /// Subset of `authors` whose affiliation classifies as industry
    pub non_academic_authors: Vec<Author>,
}

impl Paper {
    /// Email of the first corresponding author that has one.
    pub fn corresponding_author_email(&self) -> Option<&str> {
        self.authors
            .iter()
            .filter(|a| a.is_corresponding)
            .find_map(|a| a.email.as_deref().filter(|e| !e.is_empty()))
    }

    /// Distinct affiliations of the non-academic authors, in first-seen order.
    pub fn company_affiliations(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.non_academic_authors
            .iter()
            .map(|a| a.affiliation.as_str())
            .filter(|aff| seen.insert(*aff))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(name: &str, affiliation: &str, email: Option<&str>, corresponding: bool) -> Author {
        Author {
            name: name.to_string(),
            affiliation: affiliation.to_string(),
            email: email.map(str::to_string),
            is_corresponding: corresponding,
        }
    }

    #[test]
    fn test_corresponding_email_skips_authors_without_email() {
        let authors = vec![
            author("Smith Jane", "Pfizer Inc.", None, true),
            author("Doe John", "Acme Biotech", Some("john@acme.com"), true),
            author("Roe Ann", "Acme Biotech", Some("ann@acme.com"), false),
        ];
        let paper = Paper {
            pubmed_id: "1".to_string(),
            title: "T".to_string(),
            publication_date: "2023".to_string(),
            non_academic_authors: authors.clone(),
            authors,
        };
        assert_eq!(paper.corresponding_author_email(), Some("john@acme.com"));
    }

    #[test]
    fn test_company_affiliations_are_distinct_and_ordered() {
        let authors = vec![
            author("A", "Pfizer Inc.", None, false),
            author("B", "Acme Biotech", None, false),
            author("C", "Pfizer Inc.", None, false),
        ];
        let paper = Paper {
            pubmed_id: "1".to_string(),
            title: "T".to_string(),
            publication_date: "2023".to_string(),
            non_academic_authors: authors.clone(),
            authors,
        };
        assert_eq!(paper.company_affiliations(), vec!["Pfizer Inc.", "Acme Biotech"]);
        assert_eq!(paper.corresponding_author_email(), None);
    }
}
