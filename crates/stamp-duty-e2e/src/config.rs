//! Suite configuration

use crate::error::{StampDutyError, StampDutyResult};
use duty_driver::BrowserConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Page where the journey starts
pub const DEFAULT_START_URL: &str =
    "https://www.service.nsw.gov.au/transaction/check-motor-vehicle-stamp-duty";

/// Directory screenshots are written to
pub const DEFAULT_RESULTS_DIR: &str = "test-results";

/// Environment variable naming the Chromium binary
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// Environment variable overriding the results directory
pub const RESULTS_DIR_ENV: &str = "STAMP_DUTY_RESULTS_DIR";

/// Environment variable overriding the start URL
pub const START_URL_ENV: &str = "STAMP_DUTY_START_URL";

/// Wait budgets, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Popup container to attach once detected
    pub popup_attach_ms: u64,
    /// Popup container to hide after close
    pub popup_hidden_ms: u64,
    /// Calculator heading to become visible
    pub element_visible_ms: u64,
    /// Popup to appear after Calculate
    pub calculate_result_ms: u64,
    /// URL change after Check online
    pub navigation_ms: u64,
    /// Interval between polls
    pub poll_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            popup_attach_ms: 3_000,
            popup_hidden_ms: 5_000,
            element_visible_ms: 5_000,
            calculate_result_ms: 10_000,
            navigation_ms: 30_000,
            poll_ms: 50,
        }
    }
}

impl Timeouts {
    /// Every budget set to `ms`, keeping the poll interval below it
    #[must_use]
    pub const fn uniform(ms: u64) -> Self {
        Self {
            popup_attach_ms: ms,
            popup_hidden_ms: ms,
            element_visible_ms: ms,
            calculate_result_ms: ms,
            navigation_ms: ms,
            poll_ms: if ms < 10 { 1 } else { ms / 10 },
        }
    }

    /// Popup attach budget
    #[must_use]
    pub const fn popup_attach(&self) -> Duration {
        Duration::from_millis(self.popup_attach_ms)
    }

    /// Popup hidden budget
    #[must_use]
    pub const fn popup_hidden(&self) -> Duration {
        Duration::from_millis(self.popup_hidden_ms)
    }

    /// Element visible budget
    #[must_use]
    pub const fn element_visible(&self) -> Duration {
        Duration::from_millis(self.element_visible_ms)
    }

    /// Calculate result budget
    #[must_use]
    pub const fn calculate_result(&self) -> Duration {
        Duration::from_millis(self.calculate_result_ms)
    }

    /// Navigation budget
    #[must_use]
    pub const fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    /// Poll interval
    #[must_use]
    pub const fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Referring page URL
    pub start_url: String,
    /// Where screenshots go
    pub results_dir: PathBuf,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Wait budgets
    pub timeouts: Timeouts,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl SuiteConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `CHROMIUM_PATH`, `STAMP_DUTY_RESULTS_DIR` and
    /// `STAMP_DUTY_START_URL`
    ///
    /// # Errors
    ///
    /// Returns [`StampDutyError::Config`] if an override is set but empty.
    pub fn from_env() -> StampDutyResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StampDutyResult<Self> {
        let non_empty = |key: &str| -> StampDutyResult<Option<String>> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => {
                    Err(StampDutyError::config(format!("{key} is set but empty")))
                }
                other => Ok(other),
            }
        };

        let mut config = Self::default();
        if let Some(path) = non_empty(CHROMIUM_PATH_ENV)? {
            config.browser = config.browser.with_chromium_path(path);
        }
        if let Some(dir) = non_empty(RESULTS_DIR_ENV)? {
            config.results_dir = PathBuf::from(dir);
        }
        if let Some(url) = non_empty(START_URL_ENV)? {
            config.start_url = url;
        }
        Ok(config)
    }

    /// Set the start URL
    #[must_use]
    pub fn with_start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = url.into();
        self
    }

    /// Set the results directory
    #[must_use]
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Set browser launch settings
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Set wait budgets
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}
