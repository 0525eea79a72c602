//! Bounded visibility polling
//!
//! Listing and detail pages hide content behind "View more" style expanders
//! that must be clicked repeatedly until they disappear. An unbounded
//! click-until-invisible loop livelocks when the element is permanently
//! stuck visible, so the loop carries an explicit attempt ceiling and
//! exceeding it is reported as an error.

use crate::browser::{BrowserError, BrowserResult, PageHandle};
use std::time::Duration;

/// Clicks `selector` until it is no longer visible, pausing `interval`
/// between attempts.
///
/// Returns the number of clicks performed. A selector that is not visible to
/// begin with succeeds immediately with zero clicks. If the element is still
/// visible after `max_attempts` clicks, [`BrowserError::ElementStuckVisible`]
/// is returned and the caller treats the link as an extraction failure.
pub async fn click_until_hidden(
    page: &dyn PageHandle,
    selector: &str,
    interval: Duration,
    max_attempts: u32,
) -> BrowserResult<u32> {
    let mut clicks = 0;

    while page.is_visible(selector).await? {
        if clicks >= max_attempts {
            return Err(BrowserError::ElementStuckVisible {
                selector: selector.to_string(),
                attempts: clicks,
            });
        }

        page.click(selector).await?;
        clicks += 1;
        tokio::time::sleep(interval).await;
    }

    if clicks > 0 {
        tracing::trace!("Dismissed '{}' after {} clicks", selector, clicks);
    }

    Ok(clicks)
}
