//! Revenue NSW motor vehicle duty calculator form.

use crate::config::Timeouts;
use crate::error::{StampDutyResult, StepContext};
use duty_driver::{AriaRole, DriverResult, ElementState, Locator, Page, TextPattern};
use tracing::{debug, info, warn};

/// Calculator form page
#[derive(Debug, Clone)]
pub struct StampDutyCalculatorPage {
    page: Page,
    timeouts: Timeouts,
}

impl StampDutyCalculatorPage {
    /// Bind to a page
    #[must_use]
    pub const fn new(page: Page, timeouts: Timeouts) -> Self {
        Self { page, timeouts }
    }

    fn page_heading() -> Locator {
        Locator::role(AriaRole::Heading).level(1)
    }

    fn passenger_vehicle_yes() -> Locator {
        Locator::new(r#"label[for="passenger_Y"]"#)
    }

    fn purchase_price_input() -> Locator {
        Locator::label(TextPattern::regex("Purchase price or value"))
    }

    fn calculate_button() -> Locator {
        Locator::role(AriaRole::Button).named(TextPattern::regex("Calculate").ignore_case())
    }

    fn vehicle_type_radio() -> Locator {
        Locator::new(r#"input[type="radio"]"#).first()
    }

    fn result_container() -> Locator {
        Locator::new(r#"dialog, [class*="modal"]"#).first()
    }

    async fn becomes_visible(&self, locator: &Locator, what: &str) -> bool {
        match self
            .page
            .wait_for(locator, ElementState::Visible, self.timeouts.element_visible())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "{what} not visible");
                false
            }
        }
    }

    async fn click_when_visible(&self, locator: &Locator) -> DriverResult<()> {
        self.page
            .wait_for(locator, ElementState::Visible, self.timeouts.element_visible())
            .await?;
        self.page.click(locator).await
    }

    /// Whether the level-1 heading is visible
    pub async fn is_page_loaded(&self) -> bool {
        self.becomes_visible(&Self::page_heading(), "calculator heading")
            .await
    }

    /// Answer "Yes" to the passenger vehicle question
    ///
    /// # Errors
    ///
    /// Returns an error if the label never becomes visible or the click fails.
    pub async fn select_passenger_vehicle_yes(&self) -> StampDutyResult<()> {
        self.click_when_visible(&Self::passenger_vehicle_yes())
            .await
            .step("select passenger vehicle Yes option")?;
        debug!("passenger vehicle: yes");
        Ok(())
    }

    /// Type the purchase price into its field
    ///
    /// # Errors
    ///
    /// Returns an error if the field never becomes visible or cannot be filled.
    pub async fn enter_purchase_price(&self, price: u64) -> StampDutyResult<()> {
        let input = Self::purchase_price_input();
        let filled = async {
            self.page
                .wait_for(&input, ElementState::Visible, self.timeouts.element_visible())
                .await?;
            self.page.fill(&input, &price.to_string()).await
        };
        filled.await.step("enter purchase price")?;
        debug!(price, "purchase price entered");
        Ok(())
    }

    /// Click Calculate and wait for a result container to attach
    ///
    /// # Errors
    ///
    /// Returns an error if the button is missing, the click fails, or no
    /// result container appears within the calculate budget.
    pub async fn click_calculate_button(&self) -> StampDutyResult<()> {
        let calculated = async {
            self.click_when_visible(&Self::calculate_button()).await?;
            self.page
                .wait_for(
                    &Self::result_container(),
                    ElementState::Attached,
                    self.timeouts.calculate_result(),
                )
                .await
        };
        calculated.await.step("click Calculate button")?;
        info!("calculation result shown");
        Ok(())
    }

    /// Whether the vehicle type radios are visible
    pub async fn is_vehicle_type_fieldset_loaded(&self) -> bool {
        self.becomes_visible(&Self::vehicle_type_radio(), "vehicle type radio")
            .await
    }

    /// Whether the purchase price field is visible
    pub async fn is_purchase_price_field_loaded(&self) -> bool {
        self.becomes_visible(&Self::purchase_price_input(), "purchase price field")
            .await
    }

    /// Current URL
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot report the URL.
    pub async fn current_url(&self) -> StampDutyResult<String> {
        self.page.url().await.step("get current URL")
    }

    /// Document title
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot report the title.
    pub async fn page_title(&self) -> StampDutyResult<String> {
        self.page.title().await.step("get page title")
    }
}
