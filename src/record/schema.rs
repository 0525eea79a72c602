//! Fixed column layout for harvested job records
//!
//! Every success file and the final consolidated file share this header,
//! regardless of which site or extractor produced the rows. Extractors set
//! whichever columns they can locate; the rest render as the absent marker.

/// Ordered column names for the tabular output files
pub const COLUMNS: &[&str] = &[
    "id",
    "site",
    "job_url",
    "job_url_direct",
    "title",
    "company",
    "location",
    "date_posted",
    "job_type",
    "salary_source",
    "interval",
    "min_amount",
    "max_amount",
    "currency",
    "is_remote",
    "work_setup",
    "job_level",
    "job_function",
    "year_of_experience",
    "education_level",
    "age_preference",
    "skill",
    "preferred_language",
    "nationality",
    "listing_type",
    "emails",
    "description",
    "requirement",
    "company_industry",
    "company_url",
    "company_logo",
    "company_url_direct",
    "company_addresses",
    "company_num_emp",
    "company_description",
];

/// Returns true if `name` is a known schema column
pub fn is_known_column(name: &str) -> bool {
    COLUMNS.contains(&name)
}
