//! Markup reading for the guest job board pages, built on `scraper`.
//!
//! The board's class names are an unstable external format. Every lookup
//! tolerates a missing element and reports it as `None`.

use std::sync::LazyLock;

use jobharvest_core::error::AppError;
use jobharvest_core::models::RawDetail;
use jobharvest_core::traits::MarkupParser;
use scraper::{ElementRef, Html, Selector};

/// A `tag.class` element query.
#[derive(Debug, Clone, Copy)]
pub struct Query {
    pub tag: &'static str,
    pub class: &'static str,
}

impl Query {
    pub const fn new(tag: &'static str, class: &'static str) -> Self {
        Self { tag, class }
    }

    fn selector(&self) -> Selector {
        Selector::parse(&format!("{}.{}", self.tag, self.class))
            .expect("job board query must be a valid selector")
    }
}

pub const LISTING_LINK: Query = Query::new("a", "base-card__full-link");
/// Title lives in an `h2`, with an `h1` on some layouts.
pub const TITLE: [Query; 2] = [
    Query::new("h2", "top-card-layout__title"),
    Query::new("h1", "top-card-layout__title"),
];
pub const COMPANY: Query = Query::new("a", "topcard__org-name-link");
pub const LOCATION: Query = Query::new("span", "topcard__flavor--bullet");
pub const DESCRIPTION: Query = Query::new("div", "show-more-less-html__markup");
pub const CRITERIA_ITEM: Query = Query::new("li", "description__job-criteria-item");

static LISTING_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| LISTING_LINK.selector());
static TITLE_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| TITLE.iter().map(Query::selector).collect());
static COMPANY_SEL: LazyLock<Selector> = LazyLock::new(|| COMPANY.selector());
static LOCATION_SEL: LazyLock<Selector> = LazyLock::new(|| LOCATION.selector());
static DESCRIPTION_SEL: LazyLock<Selector> = LazyLock::new(|| DESCRIPTION.selector());
static CRITERIA_ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| CRITERIA_ITEM.selector());
static CRITERIA_LABEL_SEL: LazyLock<Selector> = LazyLock::new(|| tag_selector("h3"));
static CRITERIA_VALUE_SEL: LazyLock<Selector> = LazyLock::new(|| tag_selector("span"));

/// Which metadata field a criteria label fills. First matching arm wins.
const CRITERIA_LABELS: &[(&[&str], Criterion)] = &[
    (&["seniority", "niveau"], Criterion::Seniority),
    (&["employment", "emploi"], Criterion::EmploymentType),
    (&["function", "fonction"], Criterion::JobFunctions),
    (&["industries", "secteurs"], Criterion::Industries),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Criterion {
    Seniority,
    EmploymentType,
    JobFunctions,
    Industries,
}

/// [`MarkupParser`] for the guest job board's search and posting markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobBoardParser;

impl JobBoardParser {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupParser for JobBoardParser {
    fn listing_links(&self, html: &str) -> Vec<String> {
        let doc = Html::parse_fragment(html);
        doc.select(&LISTING_LINK_SEL)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn parse_detail(&self, html: &str) -> Result<RawDetail, AppError> {
        let doc = Html::parse_document(html);

        let mut detail = RawDetail {
            title: find_first(&doc, &TITLE_SELS).and_then(|el| text_of(el, "")),
            company: doc.select(&COMPANY_SEL).next().and_then(|el| text_of(el, "")),
            location: doc.select(&LOCATION_SEL).next().and_then(|el| text_of(el, "")),
            description: doc
                .select(&DESCRIPTION_SEL)
                .next()
                .and_then(|el| text_of(el, "\n")),
            ..RawDetail::default()
        };

        for item in doc.select(&CRITERIA_ITEM_SEL) {
            let label = item.select(&CRITERIA_LABEL_SEL).next().and_then(|el| text_of(el, ""));
            let value = item.select(&CRITERIA_VALUE_SEL).next().and_then(|el| text_of(el, ""));
            let (Some(label), Some(value)) = (label, value) else {
                continue;
            };

            match criterion_for(&label) {
                Some(Criterion::Seniority) => detail.seniority = Some(value),
                Some(Criterion::EmploymentType) => detail.employment_type = Some(value),
                Some(Criterion::JobFunctions) => detail.job_functions = Some(value),
                Some(Criterion::Industries) => detail.industries = Some(value),
                None => tracing::debug!(%label, "Unknown job criterion"),
            }
        }

        Ok(detail)
    }
}

/// First element matching any selector, trying them in order.
fn find_first<'a>(doc: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|sel| doc.select(sel).next())
}

/// Trimmed, non-empty text nodes joined by `separator`; `None` if nothing remains.
fn text_of(el: ElementRef<'_>, separator: &str) -> Option<String> {
    let parts: Vec<&str> = el
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}

fn criterion_for(label: &str) -> Option<Criterion> {
    let label = label.to_lowercase();
    CRITERIA_LABELS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| label.contains(n)))
        .map(|(_, criterion)| *criterion)
}

fn tag_selector(tag: &str) -> Selector {
    Selector::parse(tag).expect("tag name must be a valid selector")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <li>
          <div class="base-card">
            <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/data-analyst-at-acme-3912345678?refId=abc&amp;trk=public">
              <span>Data Analyst</span>
            </a>
          </div>
        </li>
        <li>
          <div class="base-card">
            <a class="base-card__full-link extra" href="https://www.linkedin.com/jobs/view/accountant-3900000001?position=2">Accountant</a>
            <a class="other-link" href="https://www.linkedin.com/company/acme">Acme</a>
          </div>
        </li>
    "#;

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <section class="top-card-layout">
            <h1 class="top-card-layout__title">Ingénieur Données</h1>
            <a class="topcard__org-name-link" href="/company/acme">
              Acme Corp
            </a>
            <span class="topcard__flavor topcard__flavor--bullet"> Dakar, Sénégal </span>
          </section>
          <div class="show-more-less-html__markup">
            <p>Vous rejoindrez notre équipe.</p>
            <ul><li>Bac+5 en informatique</li><li>3 à 5 ans d'expérience</li></ul>
          </div>
          <ul class="description__job-criteria-list">
            <li class="description__job-criteria-item">
              <h3 class="description__job-criteria-subheader">Niveau hiérarchique</h3>
              <span class="description__job-criteria-text">Premier emploi</span>
            </li>
            <li class="description__job-criteria-item">
              <h3>Type d'emploi</h3>
              <span>Temps plein</span>
            </li>
            <li class="description__job-criteria-item">
              <h3>Fonction</h3>
              <span>Informatique</span>
            </li>
            <li class="description__job-criteria-item">
              <h3>Secteurs</h3>
              <span>Services financiers</span>
            </li>
            <li class="description__job-criteria-item">
              <h3>Something else</h3>
              <span>Ignored</span>
            </li>
          </ul>
        </body></html>
    "#;

    #[test]
    fn test_listing_links() {
        let links = JobBoardParser.listing_links(SEARCH_PAGE);
        assert_eq!(
            links,
            vec![
                "https://www.linkedin.com/jobs/view/data-analyst-at-acme-3912345678?refId=abc&trk=public",
                "https://www.linkedin.com/jobs/view/accountant-3900000001?position=2",
            ]
        );
    }

    #[test]
    fn test_listing_links_empty_page() {
        assert!(JobBoardParser.listing_links("").is_empty());
        assert!(JobBoardParser.listing_links("<ul></ul>").is_empty());
    }

    #[test]
    fn test_detail_fields() {
        let detail = JobBoardParser.parse_detail(DETAIL_PAGE).unwrap();
        assert_eq!(detail.title.as_deref(), Some("Ingénieur Données"));
        assert_eq!(detail.company.as_deref(), Some("Acme Corp"));
        assert_eq!(detail.location.as_deref(), Some("Dakar, Sénégal"));
        assert_eq!(
            detail.description.as_deref(),
            Some("Vous rejoindrez notre équipe.\nBac+5 en informatique\n3 à 5 ans d'expérience")
        );
    }

    #[test]
    fn test_detail_criteria() {
        let detail = JobBoardParser.parse_detail(DETAIL_PAGE).unwrap();
        assert_eq!(detail.seniority.as_deref(), Some("Premier emploi"));
        assert_eq!(detail.employment_type.as_deref(), Some("Temps plein"));
        assert_eq!(detail.job_functions.as_deref(), Some("Informatique"));
        assert_eq!(detail.industries.as_deref(), Some("Services financiers"));
    }

    #[test]
    fn test_title_prefers_h2() {
        let html = r#"<h1 class="top-card-layout__title">Fallback</h1>
                      <h2 class="top-card-layout__title">Primary</h2>"#;
        let detail = JobBoardParser.parse_detail(html).unwrap();
        assert_eq!(detail.title.as_deref(), Some("Primary"));
    }

    #[test]
    fn test_missing_elements_are_none() {
        let detail = JobBoardParser.parse_detail("<html><body><p>gone</p></body></html>").unwrap();
        assert_eq!(detail, RawDetail::default());
    }

    #[test]
    fn test_criterion_for() {
        assert_eq!(criterion_for("Seniority level"), Some(Criterion::Seniority));
        assert_eq!(criterion_for("Employment type"), Some(Criterion::EmploymentType));
        assert_eq!(criterion_for("Job function"), Some(Criterion::JobFunctions));
        assert_eq!(criterion_for("Industries"), Some(Criterion::Industries));
        assert_eq!(criterion_for("Salary"), None);
    }
}
