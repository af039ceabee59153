use std::fmt;

use crate::models::NOT_AVAILABLE;
use crate::text::normalize;

/// Highest education level mentioned in a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EducationLevel {
    Doctorate,
    Master,
    FourthYear,
    Bachelor,
    TwoYearTechnical,
    Baccalaureate,
    Certified,
    NotAvailable,
}

impl EducationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            EducationLevel::Doctorate => "Bac+8 / Doctorat",
            EducationLevel::Master => "Bac+5 / Master / Ingénieur",
            EducationLevel::FourthYear => "Bac+4",
            EducationLevel::Bachelor => "Bac+3 / Licence",
            EducationLevel::TwoYearTechnical => "Bac+2 / BTS / DUT",
            EducationLevel::Baccalaureate => "Bac",
            EducationLevel::Certified => "Certified",
            EducationLevel::NotAvailable => NOT_AVAILABLE,
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Taxonomy in priority order, highest credential first.
///
/// Triggers are lower-case and matched as plain substrings, so "bac" also
/// fires inside longer words. Order is load-bearing.
pub const EDUCATION_RULES: &[(EducationLevel, &[&str])] = &[
    (
        EducationLevel::Doctorate,
        &["bac+8", "doctorat", "phd", "doctorate", "dba"],
    ),
    (
        EducationLevel::Master,
        &[
            "bac+5", "master", "msc", "mba", "ingénieur", "ingenieur", "engineer", "dea", "dess",
        ],
    ),
    (EducationLevel::FourthYear, &["bac+4", "maîtrise", "m1"]),
    (
        EducationLevel::Bachelor,
        &["bac+3", "licence", "bachelor", "license", "graduate"],
    ),
    (
        EducationLevel::TwoYearTechnical,
        &[
            "bac+2",
            "bts",
            "dut",
            "deug",
            "technicien supérieur",
            "associate degree",
        ],
    ),
    (
        EducationLevel::Baccalaureate,
        &["bac", "niveau bac", "baccalauréat", "high school diploma"],
    ),
    (
        EducationLevel::Certified,
        &["certified", "certification", "certificat", "certifiée", "certifié"],
    ),
];

/// Map a description to the first education level whose triggers appear in it.
pub fn classify_education(description: Option<&str>) -> EducationLevel {
    let Some(text) = normalize(description) else {
        return EducationLevel::NotAvailable;
    };

    EDUCATION_RULES
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| text.contains(t)))
        .map(|(level, _)| *level)
        .unwrap_or(EducationLevel::NotAvailable)
}
