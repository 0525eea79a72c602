//! Site profiles: per-portal descriptors for listing pagination and
//! declarative field extraction
//!
//! Each supported portal is described by one [`SiteProfile`]: how to build a
//! listing URL for page *n*, which selector yields the detail-page links,
//! which selector signals "no results", how to pull a job id out of a link,
//! which expander buttons need dismissing on a detail page, and a
//! column-to-selector table the generic extractor walks. Adding a portal
//! means adding a profile here, not branching anywhere in the pipeline.

use crate::record::Link;
use regex::Regex;
use url::Url;

/// How a field rule reads its value from the located element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Text content of the first match
    Text,
    /// A named attribute of the first match
    Attribute(String),
    /// Text content of every match, collected as a list
    List,
}

/// One declarative extraction rule: schema column <- selector
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub column: String,
    pub selector: String,
    pub kind: FieldKind,
}

impl FieldRule {
    pub fn text(column: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            selector: selector.into(),
            kind: FieldKind::Text,
        }
    }

    pub fn attribute(
        column: impl Into<String>,
        selector: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            selector: selector.into(),
            kind: FieldKind::Attribute(name.into()),
        }
    }

    pub fn list(column: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            selector: selector.into(),
            kind: FieldKind::List,
        }
    }
}

/// Descriptor for one job portal
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Site identifier used in record rows and output file names
    pub id: String,

    /// Base URL detail links are resolved against
    pub base_url: String,

    /// Listing URL template with `{keyword}` and `{page}` placeholders
    pub listing_url_template: String,

    /// Selector matching detail-page anchors on a listing page
    pub listing_link_selector: String,

    /// Selector whose presence signals true end-of-results
    pub no_results_selector: String,

    /// A selector expected on every well-formed detail page; used both as the
    /// page-readiness wait and as the shape probe for extractor dispatch
    pub detail_probe_selector: String,

    /// Captures the job id from a detail link (first capture group)
    pub job_id_pattern: Option<Regex>,

    /// Expander buttons to dismiss before reading fields
    pub expander_selectors: Vec<String>,

    /// Selector for the raw salary string, when the portal shows one
    pub salary_selector: Option<String>,

    /// Declarative column <- selector extraction table
    pub field_rules: Vec<FieldRule>,
}

impl SiteProfile {
    /// Builds the listing URL for one page index (1-based)
    pub fn listing_page_url(&self, keyword: &str, page: u32) -> String {
        self.listing_url_template
            .replace("{keyword}", keyword)
            .replace("{page}", &page.to_string())
    }

    /// Resolves a discovered link to an absolute detail URL
    pub fn detail_url(&self, link: &Link) -> String {
        let raw = link.as_str();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return raw.to_string();
        }

        match Url::parse(&self.base_url).and_then(|base| base.join(raw)) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                raw.trim_start_matches('/')
            ),
        }
    }

    /// Extracts the job id from a detail link, if the profile knows how
    pub fn job_id(&self, link: &Link) -> Option<String> {
        let pattern = self.job_id_pattern.as_ref()?;
        pattern
            .captures(link.as_str())
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
    }
}

/// Looks up a built-in profile by site identifier
pub fn profile_for(site: &str) -> Option<SiteProfile> {
    builtin_profiles().into_iter().find(|p| p.id == site)
}

/// Identifiers of all built-in profiles
pub fn known_sites() -> Vec<String> {
    builtin_profiles().into_iter().map(|p| p.id).collect()
}

/// The four portals the harvester ships profiles for
pub fn builtin_profiles() -> Vec<SiteProfile> {
    vec![
        vietnamworks_profile(),
        careerviet_profile(),
        jobstreet_profile(),
        jobnet_profile(),
    ]
}

fn job_id_regex(pattern: &str) -> Option<Regex> {
    // Patterns are compile-time constants; a typo shows up in the unit tests.
    Regex::new(pattern).ok()
}

fn vietnamworks_profile() -> SiteProfile {
    SiteProfile {
        id: "vietnamworks".to_string(),
        base_url: "https://www.vietnamworks.com".to_string(),
        listing_url_template:
            "https://www.vietnamworks.com/jobs?q={keyword}&page={page}&sorting=relevant"
                .to_string(),
        listing_link_selector: "a.img_job_card".to_string(),
        no_results_selector: "div.noResultWrapper".to_string(),
        detail_probe_selector: "h1[name='title']".to_string(),
        job_id_pattern: job_id_regex(r"-(\d+)-jd"),
        expander_selectors: vec![
            "button.view-more-job-info".to_string(),
            "button.view-full-description".to_string(),
        ],
        salary_selector: Some("span.salary".to_string()),
        field_rules: vec![
            FieldRule::text("title", "h1[name='title']"),
            FieldRule::list("location", "div.job-locations p"),
            FieldRule::text("date_posted", "p.posted-date"),
            FieldRule::text("job_type", "p.working-type"),
            FieldRule::text("job_level", "p.job-level"),
            FieldRule::text("job_function", "p.job-function"),
            FieldRule::text("year_of_experience", "p.year-of-experience"),
            FieldRule::text("education_level", "p.education-level"),
            FieldRule::text("age_preference", "p.age-preference"),
            FieldRule::text("skill", "p.skills"),
            FieldRule::text("preferred_language", "p.preferred-language"),
            FieldRule::text("nationality", "p.nationality"),
            FieldRule::text("description", "div.job-description"),
            FieldRule::text("requirement", "div.job-requirements"),
            FieldRule::text("company", "a.company-name"),
            FieldRule::attribute("company_url", "a.company-name", "href"),
            FieldRule::attribute("company_logo", "img.company-logo", "src"),
        ],
    }
}

fn careerviet_profile() -> SiteProfile {
    SiteProfile {
        id: "careerviet".to_string(),
        base_url: "https://careerviet.vn".to_string(),
        listing_url_template:
            "https://careerviet.vn/jobs/{keyword}-k-page-{page}-en.html".to_string(),
        listing_link_selector: "div.job-item a.job_link".to_string(),
        no_results_selector: "div.no-search-result".to_string(),
        detail_probe_selector: "h1.title".to_string(),
        job_id_pattern: job_id_regex(r"\.([0-9A-F]+)\.html"),
        expander_selectors: vec![],
        salary_selector: Some("p.job-salary".to_string()),
        field_rules: vec![
            FieldRule::text("title", "h1.title"),
            FieldRule::text("company", "a.employer-name"),
            FieldRule::list("location", "div.map a"),
            FieldRule::text("date_posted", "div.job-detail-updated span"),
            FieldRule::text("job_type", "div.job-type p"),
            FieldRule::text("job_level", "div.job-level p"),
            FieldRule::text("year_of_experience", "div.job-experience p"),
            FieldRule::text("description", "div.job-description"),
            FieldRule::text("requirement", "div.job-requirement"),
            FieldRule::text("skill", "div.job-tags"),
        ],
    }
}

fn jobstreet_profile() -> SiteProfile {
    SiteProfile {
        id: "jobstreet".to_string(),
        base_url: "https://www.jobstreet.com.my".to_string(),
        listing_url_template:
            "https://www.jobstreet.com.my/{keyword}-jobs?page={page}".to_string(),
        listing_link_selector: "article a[data-automation='jobTitle']".to_string(),
        no_results_selector: "div[data-automation='searchZeroResults']".to_string(),
        detail_probe_selector: "h1[data-automation='job-detail-title']".to_string(),
        job_id_pattern: job_id_regex(r"/job/(\d+)"),
        expander_selectors: vec![],
        salary_selector: Some("span[data-automation='job-detail-salary']".to_string()),
        field_rules: vec![
            FieldRule::text("title", "h1[data-automation='job-detail-title']"),
            FieldRule::text("company", "span[data-automation='advertiser-name']"),
            FieldRule::list("location", "span[data-automation='job-detail-location']"),
            FieldRule::text("job_type", "span[data-automation='job-detail-work-type']"),
            FieldRule::text(
                "job_function",
                "span[data-automation='job-detail-classifications']",
            ),
            FieldRule::text("date_posted", "span[data-automation='job-detail-date']"),
            FieldRule::text("description", "div[data-automation='jobAdDetails']"),
        ],
    }
}

fn jobnet_profile() -> SiteProfile {
    SiteProfile {
        id: "jobnet".to_string(),
        base_url: "https://www.jobnet.com.mm".to_string(),
        listing_url_template:
            "https://www.jobnet.com.mm/jobs?keyword={keyword}&page={page}".to_string(),
        listing_link_selector: "a.search__job-title".to_string(),
        no_results_selector: "div.search__no-results".to_string(),
        detail_probe_selector: "h1.job-details__title".to_string(),
        job_id_pattern: job_id_regex(r"/job/(\d+)"),
        expander_selectors: vec![],
        salary_selector: Some("div.job-details__salary span".to_string()),
        field_rules: vec![
            FieldRule::text("title", "h1.job-details__title"),
            FieldRule::text("company", "a.job-details__company"),
            FieldRule::list("location", "div.job-details__location span"),
            FieldRule::text("date_posted", "div.job-details__posted span"),
            FieldRule::text("job_type", "div.job-details__type span"),
            FieldRule::text("education_level", "div.job-details__education span"),
            FieldRule::text("description", "div.job-details__description"),
            FieldRule::text("requirement", "div.job-details__requirements"),
        ],
    }
}
