//! Offline replica of the two sites the journey crosses.

#![allow(dead_code)]

use duty_driver::{ClickReaction, MockDriver};
use stamp_duty_e2e::{config::DEFAULT_START_URL, SuiteConfig, Timeouts};
use std::path::Path;

/// Revenue NSW calculator the "Check online" button leads to
pub const CALCULATOR_URL: &str =
    "https://www.apps09.revenue.nsw.gov.au/erevenue/calculators/motorsimple.php";

pub const SERVICE_NSW_HTML: &str = include_str!("../fixtures/service-nsw.html");
pub const CALCULATOR_HTML: &str = include_str!("../fixtures/calculator.html");
pub const CALCULATOR_RESULT_HTML: &str = include_str!("../fixtures/calculator-result.html");

/// Mock driver serving the replica: Check online navigates to the
/// calculator, Calculate renders the result dialog
pub fn replica_site() -> MockDriver {
    replica_site_with_result(CALCULATOR_RESULT_HTML)
}

/// Replica whose Calculate button renders `result_html`
pub fn replica_site_with_result(result_html: &str) -> MockDriver {
    MockDriver::new()
        .with_page(DEFAULT_START_URL, SERVICE_NSW_HTML)
        .with_page(CALCULATOR_URL, CALCULATOR_HTML)
        .on_click("#check-online", ClickReaction::Navigate(CALCULATOR_URL.to_string()))
        .on_click(
            "#calculate",
            ClickReaction::Render(result_html.to_string()),
        )
        .on_click(
            "dialog button",
            ClickReaction::Render(result_html.replace("<dialog open>", "<dialog>")),
        )
}

/// Short budgets so failing paths finish quickly
pub fn fast_config(results_dir: &Path) -> SuiteConfig {
    SuiteConfig::new()
        .with_results_dir(results_dir)
        .with_timeouts(Timeouts::uniform(200))
}

/// Install the test subscriber once per binary
pub fn init_logging() {
    let _ = duty_driver::init_tracing(duty_driver::LogFormat::Pretty);
}
