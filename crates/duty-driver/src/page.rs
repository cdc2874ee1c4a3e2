//! Page handle shared by the page objects of one test.
//!
//! [`Page`] wraps a [`PageDriver`] with the auto-wait behaviour tests expect:
//! actions wait for their target to be visible, text reads wait for it to be
//! attached, and every wait is bounded.

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{DriverError, DriverResult};
use crate::wait::{self, ElementState, DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cheap-clone handle to one browser tab
#[derive(Debug, Clone)]
pub struct Page {
    driver: Arc<dyn PageDriver>,
    action_timeout: Duration,
    poll_interval: Duration,
}

impl Page {
    /// Wrap a driver with default timeouts
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            action_timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set how long actions auto-wait for their target
    #[must_use]
    pub const fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Set the polling interval for waits
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Navigate to a URL
    pub async fn goto(&self, url: &str) -> DriverResult<()> {
        debug!(url, "goto");
        self.driver.goto(url).await
    }

    /// Current URL
    pub async fn url(&self) -> DriverResult<String> {
        self.driver.url().await
    }

    /// Current document title
    pub async fn title(&self) -> DriverResult<String> {
        self.driver.title().await
    }

    /// Number of elements the locator currently resolves to
    pub async fn count(&self, locator: &Locator) -> DriverResult<usize> {
        let count = self.driver.query(locator).await?.len();
        debug!(%locator, count, "count");
        Ok(count)
    }

    /// Whether the first resolved element is rendered right now
    pub async fn is_visible(&self, locator: &Locator) -> DriverResult<bool> {
        let elements = self.driver.query(locator).await?;
        Ok(ElementState::Visible.is_satisfied_by(&elements))
    }

    /// Text content of the first resolved element.
    ///
    /// Waits up to the action timeout for the element to be attached.
    pub async fn text_content(&self, locator: &Locator) -> DriverResult<String> {
        self.wait_for(locator, ElementState::Attached, self.action_timeout)
            .await?;
        self.driver
            .query(locator)
            .await?
            .into_iter()
            .next()
            .map(|el| el.text)
            .ok_or_else(|| DriverError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    /// Wait until the locator reaches `state`
    pub async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> DriverResult<()> {
        debug!(%locator, %state, ?timeout, "wait_for");
        let what = format!("`{locator}` to be {state}");
        wait::poll_until(&what, timeout, self.poll_interval, || async move {
            let elements = self.driver.query(locator).await?;
            Ok::<_, DriverError>(state.is_satisfied_by(&elements))
        })
        .await
    }

    /// Wait until the URL differs from `from`, returning the new URL
    pub async fn wait_for_url_change(&self, from: &str, timeout: Duration) -> DriverResult<String> {
        let what = format!("navigation away from {from}");
        wait::poll_until(&what, timeout, self.poll_interval, || async move {
            Ok::<_, DriverError>(self.driver.url().await? != from)
        })
        .await?;
        self.driver.url().await
    }

    /// Click the first resolved element once it is visible
    pub async fn click(&self, locator: &Locator) -> DriverResult<()> {
        self.wait_for(locator, ElementState::Visible, self.action_timeout)
            .await?;
        debug!(%locator, "click");
        self.driver.click(locator).await
    }

    /// Fill the first resolved element once it is visible
    pub async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()> {
        self.wait_for(locator, ElementState::Visible, self.action_timeout)
            .await?;
        debug!(%locator, value, "fill");
        self.driver.fill(locator, value).await
    }

    /// Capture the viewport as PNG bytes
    pub async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    /// Capture the viewport and write it to `path`, creating parent
    /// directories as needed
    pub async fn screenshot_to(&self, path: impl AsRef<Path>) -> DriverResult<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let bytes = self.screenshot().await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), "screenshot written");
        Ok(path)
    }
}
