//! Per-test fixtures.
//!
//! [`PageObjects`] wires the three page objects to one shared [`Page`].
//! [`Artifacts`] writes screenshots into the results directory. With the
//! `browser` feature, [`BrowserSession`] launches Chromium and owns both.

use crate::config::SuiteConfig;
use crate::error::{StampDutyResult, StepContext};
use crate::pages::{DutyResultPopup, MotorVehicleStampDutyPage, StampDutyCalculatorPage};
use duty_driver::{Page, PageDriver};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Screenshot of the filled-in calculator form
pub const CALCULATOR_FORM_PNG: &str = "calculator-form.png";

/// Screenshot of the result popup
pub const DUTY_RESULT_POPUP_PNG: &str = "duty-result-popup.png";

/// Page objects sharing one page handle
#[derive(Debug, Clone)]
pub struct PageObjects {
    /// The shared page handle
    pub page: Page,
    /// Service NSW referring page
    pub motor_vehicle: MotorVehicleStampDutyPage,
    /// Revenue NSW calculator form
    pub calculator: StampDutyCalculatorPage,
    /// Result popup
    pub result_popup: DutyResultPopup,
}

impl PageObjects {
    /// Build page objects over `page`
    #[must_use]
    pub fn new(page: Page, config: &SuiteConfig) -> Self {
        let timeouts = config.timeouts;
        let page = page.with_poll_interval(timeouts.poll());
        Self {
            motor_vehicle: MotorVehicleStampDutyPage::new(
                page.clone(),
                config.start_url.clone(),
                timeouts,
            ),
            calculator: StampDutyCalculatorPage::new(page.clone(), timeouts),
            result_popup: DutyResultPopup::new(page.clone(), timeouts),
            page,
        }
    }

    /// Build page objects over a driver
    #[must_use]
    pub fn with_driver(driver: Arc<dyn PageDriver>, config: &SuiteConfig) -> Self {
        Self::new(Page::new(driver), config)
    }
}

/// Screenshot sink rooted at the results directory
#[derive(Debug, Clone)]
pub struct Artifacts {
    dir: PathBuf,
}

impl Artifacts {
    /// Write artifacts under `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use the configured results directory
    #[must_use]
    pub fn from_config(config: &SuiteConfig) -> Self {
        Self::new(config.results_dir.clone())
    }

    /// Results directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Screenshot the page into `name`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the capture or the write fails.
    pub async fn screenshot(&self, page: &Page, name: &str) -> StampDutyResult<PathBuf> {
        let path = page
            .screenshot_to(self.dir.join(name))
            .await
            .step("save screenshot")?;
        info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}

#[cfg(feature = "browser")]
mod session {
    use super::PageObjects;
    use crate::config::SuiteConfig;
    use crate::error::{StampDutyResult, StepContext};
    use duty_driver::Browser;

    /// Live browser plus page objects for one test
    #[derive(Debug)]
    pub struct BrowserSession {
        browser: Browser,
        /// Page objects bound to the session's tab
        pub objects: PageObjects,
    }

    impl BrowserSession {
        /// Launch Chromium and open one tab
        ///
        /// # Errors
        ///
        /// Returns an error if the browser cannot start or the tab cannot
        /// be opened.
        pub async fn launch(config: &SuiteConfig) -> StampDutyResult<Self> {
            let browser = Browser::launch(config.browser.clone())
                .await
                .step("launch browser")?;
            let page = browser.new_page().await.step("open browser tab")?;
            Ok(Self {
                browser,
                objects: PageObjects::new(page, config),
            })
        }

        /// Shut the browser down
        ///
        /// # Errors
        ///
        /// Returns an error if the browser does not close cleanly.
        pub async fn close(self) -> StampDutyResult<()> {
            self.browser.close().await.step("close browser")
        }
    }
}

#[cfg(feature = "browser")]
pub use session::BrowserSession;
