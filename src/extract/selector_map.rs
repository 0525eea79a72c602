//! Declarative field extraction driven by a site profile's rule table
//!
//! The extractor dismisses any expander buttons the profile declares, then
//! walks the column <- selector table. A rule whose selector matches nothing
//! sets the absent marker and moves on; per-field misses never fail the
//! record. Only browser-level failures (navigation handled upstream, stuck
//! expanders, engine errors) propagate as extraction failures.

use crate::browser::{click_until_hidden, PageHandle};
use crate::config::BrowserConfig;
use crate::extract::{CurrencyChain, ExtractResult, PageExtractor};
use crate::record::{FieldValue, Link, Record};
use crate::site::{FieldKind, SiteProfile};
use async_trait::async_trait;

pub struct SelectorMapExtractor {
    profile: SiteProfile,
    browser: BrowserConfig,
    currencies: CurrencyChain,
}

impl SelectorMapExtractor {
    pub fn new(profile: SiteProfile, browser: BrowserConfig) -> Self {
        Self {
            profile,
            browser,
            currencies: CurrencyChain::standard(),
        }
    }

    /// Replaces the currency resolver chain (markets outside the defaults)
    pub fn with_currency_chain(mut self, currencies: CurrencyChain) -> Self {
        self.currencies = currencies;
        self
    }

    async fn read_field(
        &self,
        page: &dyn PageHandle,
        selector: &str,
        kind: &FieldKind,
    ) -> ExtractResult<FieldValue> {
        match kind {
            FieldKind::Text => {
                let text = match page.locate(selector).await? {
                    Some(element) => element.read_text().await?,
                    None => None,
                };
                Ok(FieldValue::from_optional_text(text))
            }
            FieldKind::Attribute(name) => {
                let value = match page.locate(selector).await? {
                    Some(element) => element.read_attribute(name).await?,
                    None => None,
                };
                Ok(FieldValue::from_optional_text(value))
            }
            FieldKind::List => {
                let mut items = Vec::new();
                for element in page.locate_all(selector).await? {
                    if let Some(text) = element.read_text().await? {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            items.push(trimmed.to_string());
                        }
                    }
                }
                if items.is_empty() {
                    Ok(FieldValue::Absent)
                } else {
                    Ok(FieldValue::List(items))
                }
            }
        }
    }

    /// Salary columns derived from the raw salary string, when the portal
    /// shows one and it is not a "negotiable"/"competitive" placeholder.
    /// Amount parsing is left to the site-specific extractors.
    async fn apply_salary(&self, page: &dyn PageHandle, record: &mut Record) -> ExtractResult<()> {
        let Some(selector) = &self.profile.salary_selector else {
            return Ok(());
        };

        let text = match page.locate(selector).await? {
            Some(element) => element.read_text().await?,
            None => None,
        };
        let Some(text) = text else {
            return Ok(());
        };

        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() || lowered == "negotiable" || lowered == "competitive" {
            return Ok(());
        }

        record.set("salary_source", FieldValue::Text("direct_data".to_string()));
        if let Some(code) = self.currencies.resolve(&lowered) {
            record.set("currency", FieldValue::Text(code.to_string()));
        }
        if let Some(interval) = salary_interval(&lowered) {
            record.set("interval", FieldValue::Text(interval.to_string()));
        }
        Ok(())
    }
}

/// Maps pay-period wording to the interval column values
fn salary_interval(salary_text: &str) -> Option<&'static str> {
    if salary_text.contains("year") || salary_text.contains("annum") {
        Some("yearly")
    } else if salary_text.contains("month") {
        Some("monthly")
    } else if salary_text.contains("week") {
        Some("weekly")
    } else if salary_text.contains("day") {
        Some("daily")
    } else if salary_text.contains("hour") {
        Some("hourly")
    } else {
        None
    }
}

#[async_trait]
impl PageExtractor for SelectorMapExtractor {
    async fn extract_loaded(&self, link: &Link, page: &dyn PageHandle) -> ExtractResult<Record> {
        for selector in &self.profile.expander_selectors {
            click_until_hidden(
                page,
                selector,
                self.browser.poll_interval(),
                self.browser.max_poll_attempts,
            )
            .await?;
        }

        let mut record = Record::new(self.profile.id.clone(), link.clone());
        record.set(
            "job_url",
            FieldValue::Text(self.profile.detail_url(link)),
        );
        if let Some(id) = self.profile.job_id(link) {
            record.set("id", FieldValue::Text(id));
        }

        for rule in &self.profile.field_rules {
            let value = self.read_field(page, &rule.selector, &rule.kind).await?;
            record.set(rule.column.clone(), value);
        }

        self.apply_salary(page, &mut record).await?;
        Ok(record)
    }
}
