//! Academic vs. industry classification of affiliation strings.
//!
//! An affiliation is non-academic when it matches at least one industry cue
//! and no academic cue. Mixed strings ("University X Pharma Spin-off") are
//! classified as academic.

use regex::Regex;
use std::sync::LazyLock;

/// An industry cue. A match whose `veto` group participated does not count,
/// which stands in for a negative lookbehind.
struct IndustryCue {
    pattern: Regex,
}

impl IndustryCue {
    fn new(pattern: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("industry pattern must compile"),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.pattern
            .captures_iter(text)
            .any(|caps| caps.name("veto").is_none())
    }
}

static INDUSTRY_CUES: LazyLock<Vec<IndustryCue>> = LazyLock::new(|| {
    vec![
        IndustryCue::new(
            r"(?i)(pharma|biotech|therapeutics|biosciences|laboratories|inc\.|corp\.|ltd\.|llc|gmbh|co\.|biopharma|biopharm)",
        ),
        IndustryCue::new(r"(?i)(?P<veto>medical )?(company|corporation)"),
        IndustryCue::new(r"(?i)(?P<veto>university )?labs"),
    ]
});

static ACADEMIC_CUES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(university|college|institute|school|academy|medical center|medical school|hospital|clinic|foundation)",
        r"(?i)(department|faculty|division|center for)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("academic pattern must compile"))
    .collect()
});

/// Returns true if any industry cue matches `affiliation`.
pub fn has_industry_cue(affiliation: &str) -> bool {
    INDUSTRY_CUES.iter().any(|cue| cue.matches(affiliation))
}

/// Returns true if any academic cue matches `affiliation`.
pub fn has_academic_cue(affiliation: &str) -> bool {
    ACADEMIC_CUES.iter().any(|re| re.is_match(affiliation))
}

/// Decide whether `affiliation` names a non-academic (industry) organization.
pub fn is_non_academic(affiliation: &str) -> bool {
    let affiliation = affiliation.trim();
    if affiliation.is_empty() {
        return false;
    }
    has_industry_cue(affiliation) && !has_academic_cue(affiliation)
}
