//! Duty Driver: the browser layer under the stamp duty end-to-end suite.
//!
//! Page objects hold [`Locator`]s and a shared [`Page`]; the page forwards
//! every query and action to a [`PageDriver`]. Two drivers ship here:
//!
//! - `CdpDriver` (feature `browser`) runs Chromium over the `DevTools`
//!   Protocol via chromiumoxide.
//! - [`MockDriver`] serves static HTML parsed with `scraper`, so page objects
//!   can be tested without a browser.
//!
//! ```text
//! ┌──────────────┐    ┌──────────┐    ┌────────────┐    ┌──────────────┐
//! │ Page objects │───►│   Page   │───►│ PageDriver │───►│ CdpDriver    │
//! │ (locators)   │    │ (waits)  │    │  (trait)   │    │ MockDriver   │
//! └──────────────┘    └──────────┘    └────────────┘    └──────────────┘
//! ```

#![warn(missing_docs)]

mod assertion;
mod browser;
mod driver;
mod locator;
pub mod logging;
mod mock;
mod page;
mod result;
pub mod wait;

pub use assertion::{Assertion, AssertionResult};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{Browser, CdpDriver};
pub use driver::{ElementSnapshot, PageDriver};
pub use locator::{AriaRole, Locator, ScriptAction, Step, TextPattern};
pub use logging::{init_tracing, LogFormat};
pub use mock::{ClickReaction, MockDriver, MOCK_PNG};
pub use page::Page;
pub use result::{DriverError, DriverResult};
pub use wait::ElementState;
