//! End-to-end suite for the NSW motor vehicle stamp duty calculator.
//!
//! The journey starts on Service NSW's "Check motor vehicle stamp duty"
//! page, follows "Check online" to the Revenue NSW calculator, submits a
//! passenger vehicle purchase and reads the duty from the result popup.
//!
//! ```text
//! MotorVehicleStampDutyPage ──► StampDutyCalculatorPage ──► DutyResultPopup
//!   navigate                      select Yes / price          dialog or modal
//!   Check online                  Calculate                   duty payable
//! ```
//!
//! Page objects run on any [`duty_driver::PageDriver`]; the scenario tests
//! use a live Chromium session (feature `browser`) or replica pages served
//! by [`duty_driver::MockDriver`].

#![warn(missing_docs)]

pub mod config;
mod error;
pub mod fixture;
pub mod pages;

pub use config::{SuiteConfig, Timeouts};
pub use error::{StampDutyError, StampDutyResult, StepContext};
#[cfg(feature = "browser")]
pub use fixture::BrowserSession;
pub use fixture::{Artifacts, PageObjects, CALCULATOR_FORM_PNG, DUTY_RESULT_POPUP_PNG};
pub use pages::{DutyResultPopup, MotorVehicleStampDutyPage, PopupShape, StampDutyCalculatorPage};
