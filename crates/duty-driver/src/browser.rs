//! Browser control for headless testing.
//!
//! Real browser control goes through the Chrome `DevTools` Protocol. When
//! compiled with the `browser` feature, chromiumoxide launches Chromium and
//! [`CdpDriver`] implements [`crate::PageDriver`] by evaluating compiled
//! locator scripts in the page. Without the feature only [`BrowserConfig`] is
//! available and tests run on [`crate::MockDriver`].

use crate::result::{DriverError, DriverResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 900,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Check that an explicit chromium path names an existing file.
    ///
    /// Auto-detection (no path) always passes here.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::BrowserNotFound`] if the path does not exist.
    pub fn check_executable(&self) -> DriverResult<()> {
        match self.chromium_path.as_deref() {
            Some(path) if !Path::new(path).is_file() => Err(DriverError::BrowserNotFound {
                path: path.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{ElementSnapshot, PageDriver};
    use crate::locator::{Locator, ScriptAction};
    use crate::page::Page;
    use crate::result::{DriverError, DriverResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tracing::{debug, info};

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> DriverResult<Self> {
            info!(
                headless = config.headless,
                width = config.viewport_width,
                height = config.viewport_height,
                "launching browser"
            );
            config.check_executable()?;
            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            if let Some(ref ua) = config.user_agent {
                builder = builder.arg(format!("--user-agent={ua}"));
            }

            let cdp_config = builder
                .build()
                .map_err(|message| DriverError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                DriverError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            // Drive the CDP event loop until the connection drops
            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a new tab and wrap it in a [`Page`] handle
        ///
        /// # Errors
        ///
        /// Returns error if the tab cannot be created
        pub async fn new_page(&self) -> DriverResult<Page> {
            let browser = self.inner.lock().await;
            let cdp_page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| DriverError::PageError {
                    message: e.to_string(),
                })?;
            debug!("opened new tab");
            Ok(Page::new(Arc::new(CdpDriver::new(cdp_page))))
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        ///
        /// # Errors
        ///
        /// Returns error if the browser does not shut down cleanly
        pub async fn close(self) -> DriverResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| DriverError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            drop(browser);
            self.handle.abort();
            info!("browser closed");
            Ok(())
        }
    }

    /// [`PageDriver`] over one chromiumoxide tab
    #[derive(Debug)]
    pub struct CdpDriver {
        inner: Arc<Mutex<CdpPage>>,
    }

    impl CdpDriver {
        /// Wrap a chromiumoxide page
        #[must_use]
        pub fn new(page: CdpPage) -> Self {
            Self {
                inner: Arc::new(Mutex::new(page)),
            }
        }

        async fn eval<T: DeserializeOwned>(&self, locator: &Locator, script: &str) -> DriverResult<T> {
            let page = self.inner.lock().await;
            let result = page
                .evaluate(script)
                .await
                .map_err(|e| DriverError::query(locator, e.to_string()))?;
            Ok(result.into_value()?)
        }
    }

    /// A document being swapped out by navigation has no elements yet.
    fn is_navigation_race(err: &DriverError) -> bool {
        matches!(err, DriverError::QueryError { message, .. }
            if message.contains("Execution context was destroyed")
                || message.contains("Cannot find context"))
    }

    #[async_trait]
    impl PageDriver for CdpDriver {
        async fn goto(&self, url: &str) -> DriverResult<()> {
            let page = self.inner.lock().await;
            page.goto(url)
                .await
                .map_err(|e| DriverError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn url(&self) -> DriverResult<String> {
            let page = self.inner.lock().await;
            let url = page.url().await.map_err(|e| DriverError::PageError {
                message: e.to_string(),
            })?;
            Ok(url.unwrap_or_default())
        }

        async fn title(&self) -> DriverResult<String> {
            let page = self.inner.lock().await;
            let title = page.get_title().await.map_err(|e| DriverError::PageError {
                message: e.to_string(),
            })?;
            Ok(title.unwrap_or_default())
        }

        async fn query(&self, locator: &Locator) -> DriverResult<Vec<ElementSnapshot>> {
            let script = locator.to_script(&ScriptAction::Snapshot);
            match self.eval(locator, &script).await {
                Err(e) if is_navigation_race(&e) => Ok(Vec::new()),
                other => other,
            }
        }

        async fn click(&self, locator: &Locator) -> DriverResult<()> {
            let script = locator.to_script(&ScriptAction::Click);
            let clicked: bool = self.eval(locator, &script).await?;
            if clicked {
                Ok(())
            } else {
                Err(DriverError::ElementNotFound {
                    locator: locator.to_string(),
                })
            }
        }

        async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()> {
            let script = locator.to_script(&ScriptAction::Fill(value.to_string()));
            let filled: bool = self.eval(locator, &script).await.map_err(|e| {
                DriverError::InputError {
                    message: e.to_string(),
                }
            })?;
            if filled {
                Ok(())
            } else {
                Err(DriverError::ElementNotFound {
                    locator: locator.to_string(),
                })
            }
        }

        async fn screenshot(&self) -> DriverResult<Vec<u8>> {
            let page = self.inner.lock().await;
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot =
                page.execute(params)
                    .await
                    .map_err(|e| DriverError::ScreenshotError {
                        message: e.to_string(),
                    })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| DriverError::ScreenshotError {
                    message: e.to_string(),
                })
        }
    }

}

#[cfg(feature = "browser")]
pub use cdp::{Browser, CdpDriver};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert_eq!((config.viewport_width, config.viewport_height), (1280, 900));
        assert!(config.chromium_path.is_none());
    }

    #[test]
    fn test_builder() {
        let config = BrowserConfig::default()
            .with_viewport(1920, 1080)
            .with_headless(false)
            .with_chromium_path("/usr/bin/chromium")
            .with_user_agent("suite/1.0")
            .with_no_sandbox();
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.user_agent.as_deref(), Some("suite/1.0"));
    }

    #[test]
    fn test_check_executable() {
        assert!(BrowserConfig::default().check_executable().is_ok());

        let missing = BrowserConfig::default().with_chromium_path("/nonexistent/chromium");
        let err = missing.check_executable().unwrap_err();
        assert!(matches!(err, DriverError::BrowserNotFound { ref path } if path == "/nonexistent/chromium"));

        let file = tempfile::NamedTempFile::new().unwrap();
        let present = BrowserConfig::default().with_chromium_path(file.path().to_string_lossy());
        assert!(present.check_executable().is_ok());
    }
}
