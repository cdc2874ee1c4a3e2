//! Service NSW "Check motor vehicle stamp duty" page.

use crate::config::Timeouts;
use crate::error::{StampDutyResult, StepContext};
use duty_driver::{AriaRole, ElementState, Locator, Page, TextPattern};
use tracing::{info, warn};

/// Hosts the journey may legitimately land on after "Check online"
pub const EXPECTED_HOSTS: [&str; 2] = ["revenue.nsw.gov.au", "service.nsw.gov.au"];

/// Referring page that links out to the Revenue NSW calculator
#[derive(Debug, Clone)]
pub struct MotorVehicleStampDutyPage {
    page: Page,
    url: String,
    timeouts: Timeouts,
}

impl MotorVehicleStampDutyPage {
    /// Bind to a page; `url` is where [`Self::navigate`] goes
    #[must_use]
    pub fn new(page: Page, url: impl Into<String>, timeouts: Timeouts) -> Self {
        Self {
            page,
            url: url.into(),
            timeouts,
        }
    }

    fn check_online_button() -> Locator {
        Locator::role(AriaRole::Button).named(TextPattern::literal("Check online"))
    }

    /// Open the referring page
    ///
    /// # Errors
    ///
    /// Returns an error if navigation fails.
    pub async fn navigate(&self) -> StampDutyResult<()> {
        info!(url = %self.url, "opening motor vehicle stamp duty page");
        self.page
            .goto(&self.url)
            .await
            .step("open motor vehicle stamp duty page")
    }

    /// Click "Check online" and let the calculator load.
    ///
    /// The follow-up navigation is awaited up to the navigation budget; if
    /// the URL has not changed by then the click still counts and the
    /// calculator checks that follow decide the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the button never becomes visible or the click
    /// fails.
    pub async fn click_check_online_button(&self) -> StampDutyResult<()> {
        let button = Self::check_online_button();
        let before = self.page.url().await.step("click Check online button")?;
        self.page
            .wait_for(&button, ElementState::Visible, self.timeouts.element_visible())
            .await
            .step("click Check online button")?;
        self.page
            .click(&button)
            .await
            .step("click Check online button")?;
        match self
            .page
            .wait_for_url_change(&before, self.timeouts.navigation())
            .await
        {
            Ok(url) => info!(%url, "left referring page"),
            Err(e) => warn!(error = %e, "no navigation after Check online"),
        }
        Ok(())
    }

    /// Whether the current URL is on a Service NSW or Revenue NSW host
    pub async fn is_revenue_nsw_page_displayed(&self) -> bool {
        match self.page.url().await {
            Ok(url) => EXPECTED_HOSTS.iter().any(|host| url.contains(host)),
            Err(e) => {
                warn!(error = %e, "could not read URL");
                false
            }
        }
    }

    /// Current URL
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot report the URL.
    pub async fn current_url(&self) -> StampDutyResult<String> {
        self.page.url().await.step("get current URL")
    }

    /// Document title
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot report the title.
    pub async fn page_title(&self) -> StampDutyResult<String> {
        self.page.title().await.step("get page title")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duty_driver::{ClickReaction, MockDriver};
    use std::sync::Arc;
    use std::time::Duration;

    const START: &str = "https://www.service.nsw.gov.au/transaction/check-motor-vehicle-stamp-duty";
    const CALC: &str = "https://www.apps09.revenue.nsw.gov.au/erevenue/calculators/motorsimple.php";

    fn referring_page(mock: MockDriver) -> (Arc<MockDriver>, MotorVehicleStampDutyPage) {
        let mock = Arc::new(mock);
        let page = Page::new(mock.clone())
            .with_action_timeout(Duration::from_millis(40))
            .with_poll_interval(Duration::from_millis(5));
        (mock, MotorVehicleStampDutyPage::new(page, START, Timeouts::uniform(40)))
    }

    fn site() -> MockDriver {
        MockDriver::new()
            .with_page(
                START,
                "<title>Check motor vehicle stamp duty | Service NSW</title>\
                 <button>Check online</button>",
            )
            .with_page(CALC, "<h1>Motor vehicle registration duty calculator</h1>")
            .on_click("button", ClickReaction::Navigate(CALC.to_string()))
    }

    #[tokio::test]
    async fn test_navigate_and_title() {
        let (mock, page) = referring_page(site());
        page.navigate().await.unwrap();
        assert!(mock.was_called(&format!("goto:{START}")));
        assert_eq!(
            page.page_title().await.unwrap(),
            "Check motor vehicle stamp duty | Service NSW"
        );
    }

    #[tokio::test]
    async fn test_check_online_reaches_revenue() {
        let (_, page) = referring_page(site());
        page.navigate().await.unwrap();
        page.click_check_online_button().await.unwrap();
        assert_eq!(page.current_url().await.unwrap(), CALC);
        assert!(page.is_revenue_nsw_page_displayed().await);
    }

    #[tokio::test]
    async fn test_click_without_navigation_is_not_fatal() {
        let (_, page) = referring_page(
            MockDriver::new().with_page(START, "<button>Check online</button>"),
        );
        page.navigate().await.unwrap();
        page.click_check_online_button().await.unwrap();
        assert_eq!(page.current_url().await.unwrap(), START);
    }

    #[tokio::test]
    async fn test_missing_button_fails_step() {
        let (_, page) = referring_page(MockDriver::new().with_page(START, "<p>Maintenance</p>"));
        page.navigate().await.unwrap();
        let err = page.click_check_online_button().await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to click Check online button:"));
    }

    #[tokio::test]
    async fn test_unexpected_host() {
        let (_, page) = referring_page(
            MockDriver::new().with_page("https://example.com/", "<p></p>"),
        );
        assert!(!page.is_revenue_nsw_page_displayed().await);
        page.page
            .goto("https://example.com/")
            .await
            .unwrap();
        assert!(!page.is_revenue_nsw_page_displayed().await);
    }

    #[tokio::test]
    async fn test_navigate_failure_is_wrapped() {
        let (_, page) = referring_page(MockDriver::new());
        let err = page.navigate().await.unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to open motor vehicle stamp duty page:"));
    }
}
