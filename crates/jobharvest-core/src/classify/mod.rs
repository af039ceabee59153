//! Heuristic classifiers over free-text job descriptions.
//!
//! Both classifiers are ordered rule tables evaluated first-match-wins:
//! a description carrying several signals resolves to the earliest rule.

pub mod education;
pub mod experience;

pub use education::{EDUCATION_RULES, EducationLevel, classify_education};
pub use experience::{ExperienceLabel, classify_experience};
