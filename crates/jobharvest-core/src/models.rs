use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::{EducationLevel, ExperienceLabel};

/// Sentinel written for any field that could not be extracted.
pub const NOT_AVAILABLE: &str = "N/A";

/// Keyword label reported for the unrestricted (empty keyword) search.
pub const GENERAL_SEARCH: &str = "General Search";

/// One (country, keyword) pagination unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSegment {
    pub country: String,
    /// Empty string means an unrestricted search.
    pub keyword: String,
}

impl SearchSegment {
    pub fn new(country: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            keyword: keyword.into(),
        }
    }

    /// Human-readable keyword, "General Search" for the empty keyword.
    pub fn display_keyword(&self) -> &str {
        display_keyword(&self.keyword)
    }
}

/// A discovered listing, keyed by its canonical URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRef {
    pub canonical_url: String,
    /// Keyword of the segment that surfaced this listing first.
    pub keyword: String,
}

/// A listing resolved to its detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRef {
    pub detail_id: String,
    pub detail_url: String,
    pub keyword: String,
    pub listing_url: String,
}

/// Fields scraped from a detail page. `None` means the element was missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDetail {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub seniority: Option<String>,
    pub employment_type: Option<String>,
    pub job_functions: Option<String>,
    pub industries: Option<String>,
}

/// One output row. Field order is the column order of both exported files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Seniority")]
    pub seniority: String,
    #[serde(rename = "Employment Type")]
    pub employment_type: String,
    #[serde(rename = "Job Functions")]
    pub job_functions: String,
    #[serde(rename = "Industries")]
    pub industries: String,
    #[serde(rename = "API Link")]
    pub api_link: String,
    #[serde(rename = "Original Link")]
    pub original_link: String,
    #[serde(rename = "Niveau Étude")]
    pub education: String,
    #[serde(rename = "Experience")]
    pub experience: String,
    #[serde(rename = "Keyword")]
    pub keyword: String,
}

impl NormalizedRecord {
    /// Combine a scraped detail with its derived labels and run metadata.
    pub fn assemble(
        detail_ref: &DetailRef,
        raw: RawDetail,
        education: EducationLevel,
        experience: &ExperienceLabel,
        capture_date: NaiveDate,
    ) -> Self {
        Self {
            date: capture_date.format("%Y-%m-%d").to_string(),
            title: or_sentinel(raw.title),
            company: or_sentinel(raw.company),
            location: or_sentinel(raw.location),
            description: or_sentinel(raw.description),
            seniority: or_sentinel(raw.seniority),
            employment_type: or_sentinel(raw.employment_type),
            job_functions: or_sentinel(raw.job_functions),
            industries: or_sentinel(raw.industries),
            api_link: detail_ref.detail_url.clone(),
            original_link: detail_ref.listing_url.clone(),
            education: education.to_string(),
            experience: experience.to_string(),
            keyword: display_keyword(&detail_ref.keyword).to_string(),
        }
    }
}

/// Borrowed view of a record without the free-text description,
/// used for the "clean" export.
#[derive(Debug, Serialize)]
pub struct CleanRecord<'a> {
    #[serde(rename = "Date")]
    pub date: &'a str,
    #[serde(rename = "Title")]
    pub title: &'a str,
    #[serde(rename = "Company")]
    pub company: &'a str,
    #[serde(rename = "Location")]
    pub location: &'a str,
    #[serde(rename = "Seniority")]
    pub seniority: &'a str,
    #[serde(rename = "Employment Type")]
    pub employment_type: &'a str,
    #[serde(rename = "Job Functions")]
    pub job_functions: &'a str,
    #[serde(rename = "Industries")]
    pub industries: &'a str,
    #[serde(rename = "API Link")]
    pub api_link: &'a str,
    #[serde(rename = "Original Link")]
    pub original_link: &'a str,
    #[serde(rename = "Niveau Étude")]
    pub education: &'a str,
    #[serde(rename = "Experience")]
    pub experience: &'a str,
    #[serde(rename = "Keyword")]
    pub keyword: &'a str,
}

impl<'a> From<&'a NormalizedRecord> for CleanRecord<'a> {
    fn from(r: &'a NormalizedRecord) -> Self {
        Self {
            date: &r.date,
            title: &r.title,
            company: &r.company,
            location: &r.location,
            seniority: &r.seniority,
            employment_type: &r.employment_type,
            job_functions: &r.job_functions,
            industries: &r.industries,
            api_link: &r.api_link,
            original_link: &r.original_link,
            education: &r.education,
            experience: &r.experience,
            keyword: &r.keyword,
        }
    }
}

fn display_keyword(keyword: &str) -> &str {
    if keyword.is_empty() {
        GENERAL_SEARCH
    } else {
        keyword
    }
}

fn or_sentinel(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_ref(keyword: &str) -> DetailRef {
        DetailRef {
            detail_id: "123456".into(),
            detail_url: "https://example.com/jobPosting/123456".into(),
            keyword: keyword.into(),
            listing_url: "https://example.com/jobs/view/data-analyst-123456".into(),
        }
    }

    #[test]
    fn test_missing_fields_become_sentinel() {
        let raw = RawDetail {
            title: Some("Data Analyst".into()),
            ..RawDetail::default()
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let record = NormalizedRecord::assemble(
            &detail_ref("data"),
            raw,
            EducationLevel::NotAvailable,
            &ExperienceLabel::NotAvailable,
            date,
        );

        assert_eq!(record.date, "2026-10-14");
        assert_eq!(record.title, "Data Analyst");
        assert_eq!(record.company, NOT_AVAILABLE);
        assert_eq!(record.description, NOT_AVAILABLE);
        assert_eq!(record.industries, NOT_AVAILABLE);
        assert_eq!(record.keyword, "data");
        assert_eq!(record.api_link, "https://example.com/jobPosting/123456");
    }

    #[test]
    fn test_empty_keyword_reported_as_general_search() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let record = NormalizedRecord::assemble(
            &detail_ref(""),
            RawDetail::default(),
            EducationLevel::Bachelor,
            &ExperienceLabel::Years("4".into()),
            date,
        );
        assert_eq!(record.keyword, GENERAL_SEARCH);
        assert_eq!(record.education, "Bac+3 / Licence");
        assert_eq!(record.experience, "4 ans/years");
    }

    #[test]
    fn test_segment_display_keyword() {
        assert_eq!(SearchSegment::new("Eastern Africa", "").display_keyword(), GENERAL_SEARCH);
        assert_eq!(SearchSegment::new("Eastern Africa", "rust").display_keyword(), "rust");
    }
}
