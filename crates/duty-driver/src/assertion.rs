//! Scenario assertions.
//!
//! Checks produce an [`AssertionResult`] instead of panicking so a scenario
//! can log the outcome before turning it into an error with
//! [`AssertionResult::into_result`].

use crate::locator::TextPattern;
use crate::result::{DriverError, DriverResult};
use std::fmt::Debug;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the check passed
    pub passed: bool,
    /// Failure message, empty on success
    pub message: String,
}

impl AssertionResult {
    /// A passing result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// A failing result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into a [`DriverResult`].
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::AssertionFailed`] carrying the message if the
    /// check failed.
    pub fn into_result(self) -> DriverResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(DriverError::AssertionFailed {
                message: self.message,
            })
        }
    }
}

/// Assertion helpers
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// `haystack` contains `needle`
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {haystack:?} to contain {needle:?}"))
        }
    }

    /// `text` matches `pattern`.
    ///
    /// A pattern that fails to compile is a failed check, not a panic.
    #[must_use]
    pub fn matches(text: &str, pattern: &TextPattern) -> AssertionResult {
        match pattern.compile() {
            Ok(re) if re.is_match(text) => AssertionResult::pass(),
            Ok(_) => AssertionResult::fail(format!("expected {text:?} to match {pattern}")),
            Err(e) => AssertionResult::fail(format!("invalid pattern {pattern}: {e}")),
        }
    }

    /// Condition holds
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }
}
