//! PageDriver - the browser engine contract.
//!
//! Everything the page objects need from a browser goes through this trait,
//! so the same page objects run against Chromium over CDP ([`crate::CdpDriver`],
//! feature `browser`) or against static HTML ([`crate::MockDriver`]).
//!
//! Drivers only take snapshots and perform single actions. Waiting, timeouts
//! and auto-wait live one level up in [`crate::Page`].

use crate::locator::Locator;
use crate::result::DriverResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a driver reports about one resolved element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Raw `textContent`
    pub text: String,
    /// Whether the element is rendered
    pub visible: bool,
}

impl ElementSnapshot {
    /// Create a snapshot
    #[must_use]
    pub fn new(text: impl Into<String>, visible: bool) -> Self {
        Self {
            text: text.into(),
            visible,
        }
    }
}

/// Abstract driver for one browser tab.
///
/// Methods take `&self`: a page handle is shared by every page object of a
/// test, and implementations guard their own state.
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to a URL and wait for it to load
    async fn goto(&self, url: &str) -> DriverResult<()>;

    /// Current document URL
    async fn url(&self) -> DriverResult<String>;

    /// Current document title
    async fn title(&self) -> DriverResult<String>;

    /// Resolve a locator against the current document
    async fn query(&self, locator: &Locator) -> DriverResult<Vec<ElementSnapshot>>;

    /// Click the first element the locator resolves to
    async fn click(&self, locator: &Locator) -> DriverResult<()>;

    /// Set the value of the first element the locator resolves to
    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()>;

    /// Capture the viewport as PNG bytes
    async fn screenshot(&self) -> DriverResult<Vec<u8>>;
}
