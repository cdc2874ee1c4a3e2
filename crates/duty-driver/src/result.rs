//! Result and error types for the driver layer.

use thiserror::Error;

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum DriverError {
    /// Configured browser executable does not exist
    #[error("Browser not found at {path}. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound {
        /// Path that was checked
        path: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// The query mechanism itself failed (bad selector, script error, lost page)
    #[error("Query `{locator}` failed: {message}")]
    QueryError {
        /// Locator description
        locator: String,
        /// Error message
        message: String,
    },

    /// An action needed an element but the locator resolved to nothing
    #[error("No element matches `{locator}`")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Input simulation error (click, fill)
    #[error("Input simulation failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Script result that does not decode into the expected type
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriverError {
    /// Create a query error for a locator
    #[must_use]
    pub fn query(locator: impl ToString, message: impl Into<String>) -> Self {
        Self::QueryError {
            locator: locator.to_string(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(what: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            ms,
        }
    }

    /// Whether this error is a timeout (as opposed to a mechanism failure)
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
