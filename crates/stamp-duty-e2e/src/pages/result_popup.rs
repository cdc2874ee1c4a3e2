//! Duty result popup.
//!
//! The calculator has rendered its result both as a native `<dialog>` and as
//! a class-based modal. Every read tries the dialog shape first and falls
//! back to the modal shape only when the dialog shape matches nothing.

use crate::config::Timeouts;
use crate::error::{StampDutyResult, StepContext};
use duty_driver::{DriverResult, ElementState, Locator, Page, TextPattern};
use tracing::{debug, warn};

/// The two markup shapes the popup can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupShape {
    /// Native `<dialog>`
    Dialog,
    /// Element with `modal` in its class list
    Modal,
}

impl PopupShape {
    /// Detection order
    pub const ORDER: [Self; 2] = [Self::Dialog, Self::Modal];

    /// Outer container
    #[must_use]
    pub fn container(self) -> Locator {
        match self {
            Self::Dialog => Locator::new("dialog"),
            Self::Modal => Locator::new(r#"[class*="modal"]"#),
        }
    }

    /// Result heading
    #[must_use]
    pub fn heading(self) -> Locator {
        match self {
            Self::Dialog => Locator::new("dialog h4"),
            Self::Modal => Locator::new(r#".modal-title, [class*="modal-header"]"#),
        }
    }

    /// Cells of the result table
    #[must_use]
    pub fn cells(self) -> Locator {
        match self {
            Self::Dialog => Locator::new("dialog table td"),
            Self::Modal => Locator::new(".modal-body table td"),
        }
    }

    /// Rows of the result table
    #[must_use]
    pub fn rows(self) -> Locator {
        match self {
            Self::Dialog => Locator::new("dialog table tr"),
            Self::Modal => Locator::new(".modal-body table tr"),
        }
    }

    /// Close button
    #[must_use]
    pub fn close_button(self) -> Locator {
        let buttons = match self {
            Self::Dialog => Locator::new("dialog button"),
            Self::Modal => Locator::new(r#".modal-body button, [class*="modal"] button"#),
        };
        buttons.with_text(TextPattern::literal("Close").ignore_case())
    }
}

fn duty_payable_label() -> TextPattern {
    TextPattern::regex("duty payable").ignore_case()
}

fn duty_payable_row() -> TextPattern {
    TextPattern::literal("Duty payable")
}

/// Result popup shown after Calculate
#[derive(Debug, Clone)]
pub struct DutyResultPopup {
    page: Page,
    timeouts: Timeouts,
}

impl DutyResultPopup {
    /// Bind to a page
    #[must_use]
    pub const fn new(page: Page, timeouts: Timeouts) -> Self {
        Self { page, timeouts }
    }

    /// First shape whose `part` resolves to at least one element
    async fn first_shape_with(
        &self,
        part: impl Fn(PopupShape) -> Locator,
    ) -> DriverResult<Option<PopupShape>> {
        for shape in PopupShape::ORDER {
            if self.page.count(&part(shape)).await? > 0 {
                return Ok(Some(shape));
            }
        }
        Ok(None)
    }

    /// Whether either popup shape is in the document
    pub async fn is_popup_displayed(&self) -> bool {
        let detected = async {
            let Some(shape) = self.first_shape_with(PopupShape::container).await? else {
                return Ok(false);
            };
            self.page
                .wait_for(
                    &shape.container().first(),
                    ElementState::Attached,
                    self.timeouts.popup_attach(),
                )
                .await?;
            debug!(?shape, "popup detected");
            DriverResult::Ok(true)
        };
        detected.await.unwrap_or_else(|e| {
            warn!(error = %e, "popup detection failed");
            false
        })
    }

    /// Whether a result heading exists in either shape
    pub async fn is_result_heading_loaded(&self) -> bool {
        match self.first_shape_with(PopupShape::heading).await {
            Ok(shape) => shape.is_some(),
            Err(e) => {
                warn!(error = %e, "heading check failed");
                false
            }
        }
    }

    /// Whether a table cell mentions duty payable in either shape
    pub async fn is_duty_payable_label_loaded(&self) -> bool {
        let label_cell = |shape: PopupShape| shape.cells().with_text(duty_payable_label());
        match self.first_shape_with(label_cell).await {
            Ok(shape) => shape.is_some(),
            Err(e) => {
                warn!(error = %e, "duty payable label check failed");
                false
            }
        }
    }

    /// Trimmed text of the last cell in the "Duty payable" row.
    ///
    /// Returns an empty string when neither shape has such a row.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be queried.
    pub async fn duty_payable_value(&self) -> StampDutyResult<String> {
        self.read_duty_payable_value()
            .await
            .step("get duty payable value")
    }

    async fn read_duty_payable_value(&self) -> DriverResult<String> {
        let row = |shape: PopupShape| shape.rows().with_text(duty_payable_row());
        let Some(shape) = self.first_shape_with(row).await? else {
            debug!("no duty payable row in either shape");
            return Ok(String::new());
        };
        let value_cell = row(shape).locator("td").last();
        let text = self.page.text_content(&value_cell).await?;
        debug!(?shape, value = text.trim(), "duty payable value");
        Ok(text.trim().to_string())
    }

    /// Popup displayed with both heading and duty payable label
    pub async fn are_all_popup_elements_loaded(&self) -> bool {
        self.is_popup_displayed().await
            && self.is_result_heading_loaded().await
            && self.is_duty_payable_label_loaded().await
    }

    /// Click Close and wait for the popup to hide
    ///
    /// # Errors
    ///
    /// Returns an error if no close button exists, the click fails, or the
    /// popup is still shown after the hide budget.
    pub async fn close_popup(&self) -> StampDutyResult<()> {
        self.close().await.step("close popup")
    }

    async fn close(&self) -> DriverResult<()> {
        let shape = self
            .first_shape_with(PopupShape::close_button)
            .await?
            .ok_or_else(|| duty_driver::DriverError::ElementNotFound {
                locator: format!(
                    "{} or {}",
                    PopupShape::Dialog.close_button(),
                    PopupShape::Modal.close_button()
                ),
            })?;
        self.page.click(&shape.close_button().first()).await?;
        self.page
            .wait_for(
                &shape.container().first(),
                ElementState::Hidden,
                self.timeouts.popup_hidden(),
            )
            .await?;
        debug!(?shape, "popup closed");
        Ok(())
    }

    /// Raw text of the first heading across both shapes
    ///
    /// # Errors
    ///
    /// Returns an error if no heading appears within the action timeout.
    pub async fn popup_heading_text(&self) -> StampDutyResult<String> {
        let heading = Locator::new(r#"dialog h4, .modal-title, [class*="modal-header"]"#).first();
        self.page
            .text_content(&heading)
            .await
            .step("get popup heading text")
    }

    /// Raw text of the first duty payable cell across both shapes
    ///
    /// # Errors
    ///
    /// Returns an error if no such cell appears within the action timeout.
    pub async fn duty_payable_label_text(&self) -> StampDutyResult<String> {
        let label = Locator::new("dialog table td, .modal-body table td")
            .with_text(duty_payable_label())
            .first();
        self.page
            .text_content(&label)
            .await
            .step("get duty payable label text")
    }
}
