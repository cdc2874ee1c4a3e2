//! Motor vehicle stamp duty journey.
//!
//! Given the Service NSW page, when the user follows "Check online", answers
//! the calculator for a $1,000 passenger vehicle and calculates, then the
//! popup shows $30.00 duty payable.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use duty_driver::{Assertion, TextPattern};
use stamp_duty_e2e::{
    Artifacts, PageObjects, StampDutyResult, CALCULATOR_FORM_PNG, DUTY_RESULT_POPUP_PNG,
};
use std::sync::Arc;

const PURCHASE_PRICE: u64 = 1000;
const EXPECTED_DUTY: &str = "$30.00";

async fn check_stamp_duty(objects: &PageObjects, artifacts: &Artifacts) -> StampDutyResult<()> {
    let PageObjects {
        page,
        motor_vehicle,
        calculator,
        result_popup,
    } = objects;

    // GIVEN the Service NSW motor vehicle stamp duty page
    motor_vehicle.navigate().await?;
    let title = motor_vehicle.page_title().await?;
    Assertion::contains(&title, "Check motor vehicle stamp duty").into_result()?;

    // WHEN the user clicks Check online
    motor_vehicle.click_check_online_button().await?;

    // THEN a Revenue NSW (or Service NSW) page is shown
    Assertion::is_true(
        motor_vehicle.is_revenue_nsw_page_displayed().await,
        "expected a Revenue NSW or Service NSW page",
    )
    .into_result()?;
    let url = motor_vehicle.current_url().await?;
    Assertion::matches(&url, &TextPattern::regex(r"revenue\.nsw\.gov\.au|service\.nsw\.gov\.au"))
        .into_result()?;

    // AND the calculator form is loaded
    Assertion::is_true(calculator.is_page_loaded().await, "calculator heading not visible")
        .into_result()?;
    Assertion::is_true(
        calculator.is_vehicle_type_fieldset_loaded().await,
        "vehicle type radios not visible",
    )
    .into_result()?;
    Assertion::is_true(
        calculator.is_purchase_price_field_loaded().await,
        "purchase price field not visible",
    )
    .into_result()?;
    artifacts.screenshot(page, CALCULATOR_FORM_PNG).await?;

    // WHEN the user answers Yes, enters the price and calculates
    calculator.select_passenger_vehicle_yes().await?;
    calculator.enter_purchase_price(PURCHASE_PRICE).await?;
    calculator.click_calculate_button().await?;

    // THEN the result popup shows every element and the duty
    Assertion::is_true(result_popup.is_popup_displayed().await, "result popup not displayed")
        .into_result()?;
    Assertion::is_true(
        result_popup.are_all_popup_elements_loaded().await,
        "result popup incomplete",
    )
    .into_result()?;
    Assertion::is_true(result_popup.is_result_heading_loaded().await, "no result heading")
        .into_result()?;
    Assertion::is_true(
        result_popup.is_duty_payable_label_loaded().await,
        "no duty payable label",
    )
    .into_result()?;
    let duty = result_popup.duty_payable_value().await?;
    Assertion::equals(EXPECTED_DUTY, duty.as_str()).into_result()?;

    artifacts.screenshot(page, DUTY_RESULT_POPUP_PNG).await?;
    Ok(())
}

#[tokio::test]
async fn test_check_motor_vehicle_stamp_duty_offline() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let config = common::fast_config(&dir.path().join("test-results"));
    let mock = Arc::new(common::replica_site());
    let objects = PageObjects::with_driver(mock.clone(), &config);
    let artifacts = Artifacts::from_config(&config);

    check_stamp_duty(&objects, &artifacts).await.unwrap();

    assert!(artifacts.dir().join(CALCULATOR_FORM_PNG).is_file());
    assert!(artifacts.dir().join(DUTY_RESULT_POPUP_PNG).is_file());
    let filled = mock.filled();
    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].1, "1000");
    assert!(mock.was_called(r#"click:css=label[for="passenger_Y"]"#));
}

#[tokio::test]
async fn test_journey_fails_when_duty_differs() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::fast_config(dir.path());
    let wrong = common::CALCULATOR_RESULT_HTML.replace("$30.00", "$45.00");
    let mock = Arc::new(common::replica_site_with_result(&wrong));
    let objects = PageObjects::with_driver(mock, &config);

    let err = check_stamp_duty(&objects, &Artifacts::from_config(&config))
        .await
        .unwrap_err();
    assert!(err.to_string().contains(r#"expected "$30.00", got "$45.00""#));
    assert!(!dir.path().join(DUTY_RESULT_POPUP_PNG).exists());
}

#[tokio::test]
async fn test_journey_stops_when_popup_never_appears() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::fast_config(dir.path());
    let objects = PageObjects::with_driver(
        Arc::new(common::replica_site_with_result(common::CALCULATOR_HTML)),
        &config,
    );

    let err = check_stamp_duty(&objects, &Artifacts::from_config(&config))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to click Calculate button:"));
    assert!(dir.path().join(CALCULATOR_FORM_PNG).is_file());
}

#[cfg(feature = "browser")]
#[tokio::test]
#[ignore = "drives the live Service NSW and Revenue NSW sites"]
async fn test_check_motor_vehicle_stamp_duty_live() {
    common::init_logging();
    let config = stamp_duty_e2e::SuiteConfig::from_env().unwrap();
    let session = stamp_duty_e2e::BrowserSession::launch(&config)
        .await
        .expect("launch chromium");
    let artifacts = Artifacts::from_config(&config);
    let outcome = check_stamp_duty(&session.objects, &artifacts).await;
    session.close().await.unwrap();
    outcome.unwrap();
}
