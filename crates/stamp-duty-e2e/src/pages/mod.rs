//! Page objects for the stamp duty journey.
//!
//! Each object holds a clone of the test's [`duty_driver::Page`] and builds
//! its locators on demand. Soft checks return `bool` and log failures; steps
//! return [`crate::StampDutyResult`] with the step named in the error.

mod calculator;
mod motor_vehicle;
mod result_popup;

pub use calculator::StampDutyCalculatorPage;
pub use motor_vehicle::{MotorVehicleStampDutyPage, EXPECTED_HOSTS};
pub use result_popup::{DutyResultPopup, PopupShape};
