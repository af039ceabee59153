use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::NOT_AVAILABLE;
use crate::text::normalize;

/// Years of experience asked for by a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceLabel {
    /// Explicit number of years as written, formatted as `"<N> ans/years"`.
    Years(String),
    Senior,
    Junior,
    Confirmed,
    NotAvailable,
}

impl fmt::Display for ExperienceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceLabel::Years(n) => write!(f, "{n} ans/years"),
            ExperienceLabel::Senior => f.write_str("Senior (> 5 ans)"),
            ExperienceLabel::Junior => f.write_str("Junior (0-2 ans)"),
            ExperienceLabel::Confirmed => f.write_str("Confirmé (3-5 ans)"),
            ExperienceLabel::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Numeric patterns, most specific first. Each captures the reported number
/// in group 1; for ranges that is the lower bound.
pub const NUMERIC_PATTERNS: &[&str] = &[
    // range: "3 to 5 years", "2-4 ans", "3 à 5 années"
    r"([0-9]+)\s*(?:à|au|to|-)\s*[0-9]+\s*(?:ans|years|années)",
    // minimum bound: "at least 7 years", "plus de 10 ans"
    r"(?:plus de|over|more than|min|minimum|au moins|environ|at least)\s*([0-9]+)\s*(?:ans|years|années)",
    // "5 years of experience", "3 ans d'expérience"
    r"([0-9]+)\s*(?:ans|years|années)\s*(?:d'|of)?\s*(?:expérience|experience)",
    // "minimum 3 of experience"
    r"(?:at least|min|minimum)\s*([0-9]+)\s*(?:ans|years|années)?\s*(?:of\s*)?(?:expérience|experience)",
    // catch-all: "4 years", "5+ ans"
    r"([0-9]+)\s*\+?\s*(?:ans|years|années)",
];

/// Spelled-out numbers, French and English. Scanned in this order.
pub const SPELLED_NUMBERS: &[(&str, u32)] = &[
    ("un", 1),
    ("one", 1),
    ("deux", 2),
    ("two", 2),
    ("trois", 3),
    ("three", 3),
    ("quatre", 4),
    ("four", 4),
    ("cinq", 5),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("huit", 8),
    ("neuf", 9),
    ("dix", 10),
    ("sept", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// Qualitative fallbacks when no number is stated.
pub const SENIORITY_RULES: &[(&[&str], ExperienceLabel)] = &[
    (&["senior", "sénior"], ExperienceLabel::Senior),
    (&["junior", "débutant"], ExperienceLabel::Junior),
    (&["confirmé"], ExperienceLabel::Confirmed),
];

static NUMERIC_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NUMERIC_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("experience pattern must compile"))
        .collect()
});

/// Map a description to an experience label.
///
/// Cascade: numeric patterns, then spelled numbers, then seniority keywords.
pub fn classify_experience(description: Option<&str>) -> ExperienceLabel {
    let Some(text) = normalize(description) else {
        return ExperienceLabel::NotAvailable;
    };

    if let Some(years) = numeric_years(&text) {
        return ExperienceLabel::Years(years);
    }
    if let Some(years) = spelled_years(&text) {
        return ExperienceLabel::Years(years);
    }

    SENIORITY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, label)| label.clone())
        .unwrap_or(ExperienceLabel::NotAvailable)
}

fn numeric_years(text: &str) -> Option<String> {
    NUMERIC_RES.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn spelled_years(text: &str) -> Option<String> {
    SPELLED_NUMBERS.iter().find_map(|(word, n)| {
        let matched =
            text.contains(&format!("{word} ans")) || text.contains(&format!("{word} years"));
        matched.then(|| n.to_string())
    })
}
