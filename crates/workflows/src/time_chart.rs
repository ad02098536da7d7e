//! Time chart page: measure picking, axis configuration, saving.

use bancada::{
    BancadaResult, ComboBox, Locator, ModalDialog, Page, PageDriver, PageObject,
    UrlMatcher, WaitOptions,
};
use std::sync::Arc;
use tracing::info;

/// Chart axis being configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis
    X,
    /// Vertical axis
    Y,
}

impl Axis {
    const fn input_name(self) -> &'static str {
        match self {
            Self::X => "x-axis-label",
            Self::Y => "y-axis-label",
        }
    }
}

/// Page object for the time chart designer
pub struct TimeChartPage {
    page: Page,
    measure_picker: ComboBox,
}

impl std::fmt::Debug for TimeChartPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeChartPage").finish_non_exhaustive()
    }
}

impl TimeChartPage {
    /// Bind the page object to a driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        let measure_picker =
            ComboBox::new(Arc::clone(&driver), Locator::css("div.measure-picker"));
        Self {
            page: Page::new(
                driver,
                "time chart",
                UrlMatcher::Contains("/timeChart".to_string()),
            ),
            measure_picker,
        }
    }

    /// Shared page plumbing
    #[must_use]
    pub fn page(&mut self) -> &mut Page {
        &mut self.page
    }

    /// The measure picker combo
    #[must_use]
    pub const fn measure_picker(&self) -> &ComboBox {
        &self.measure_picker
    }

    /// Add a measure to the chart through the typeahead picker
    pub async fn pick_measure(&self, label: &str) -> BancadaResult<()> {
        info!(measure = label, "picking chart measure");
        self.measure_picker.pick(label, WaitOptions::default()).await
    }

    /// Set an axis label
    pub async fn set_axis_label(&self, axis: Axis, label: &str) -> BancadaResult<()> {
        info!(?axis, label, "setting axis label");
        let input = self.page.lazy(Locator::name_attr(axis.input_name()));
        input.click().await?;
        input
            .press_key(bancada::KeyChord::plain(bancada::Key::Backspace))
            .await?;
        input.type_text(label).await
    }

    /// Save the chart as a named report through the save dialog
    pub async fn save_as(&self, report_name: &str) -> BancadaResult<()> {
        self.page.click_button("Save").await?;

        let dialog = ModalDialog::default_modal(self.page.driver());
        dialog.wait_for_open(WaitOptions::default()).await?;
        let name_input = self.page.lazy(
            Locator::css("div.modal-dialog").descendant(&Locator::name_attr("report-name")),
        );
        name_input.click().await?;
        name_input.type_text(report_name).await?;
        dialog.confirm("Save", WaitOptions::default()).await
    }
}

#[async_trait::async_trait]
impl PageObject for TimeChartPage {
    fn url_pattern(&self) -> UrlMatcher {
        UrlMatcher::Contains("/timeChart".to_string())
    }

    fn page_name(&self) -> &str {
        "time chart"
    }

    async fn is_loaded(&self) -> BancadaResult<bool> {
        self.page
            .lazy(Locator::css("div.chart-canvas"))
            .is_displayed()
            .await
    }
}
