//! Sample type designer page: QC field configuration and validation.
//!
//! Properties live in a caption-keyed detail form; per-field validation
//! messages surface as `div.field-error` inside the offending field's
//! value cell.

use bancada::{
    BancadaResult, DetailTableEdit, Locator, Page, PageDriver, PageObject, UrlMatcher,
};
use std::sync::Arc;
use tracing::info;

/// Page object for the sample type designer
pub struct SampleTypeDesignerPage {
    page: Page,
    detail: DetailTableEdit,
}

impl std::fmt::Debug for SampleTypeDesignerPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleTypeDesignerPage").finish_non_exhaustive()
    }
}

impl SampleTypeDesignerPage {
    /// Bind the page object to a driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        let detail = DetailTableEdit::new(Arc::clone(&driver), Self::form());
        Self {
            page: Page::new(
                driver,
                "sample type designer",
                UrlMatcher::Contains("/sampleTypeDesigner".to_string()),
            ),
            detail,
        }
    }

    /// Shared page plumbing
    #[must_use]
    pub fn page(&mut self) -> &mut Page {
        &mut self.page
    }

    /// The caption-keyed property form
    #[must_use]
    pub const fn properties(&self) -> &DetailTableEdit {
        &self.detail
    }

    fn form() -> Locator {
        Locator::css("table.detail-table")
    }

    fn field_error_locator(index: usize) -> Locator {
        Self::form()
            .descendant(&Locator::css("tr.field-row").index(index))
            .descendant(&Locator::css("div.field-error"))
    }

    /// Set the sample type name property
    pub async fn set_name(&self, name: &str) -> BancadaResult<()> {
        self.detail.set_text_field("Name", name).await
    }

    /// Toggle whether a field accepts missing-value indicators
    pub async fn set_missing_values_enabled(
        &self,
        field: &str,
        enabled: bool,
    ) -> BancadaResult<()> {
        info!(field, enabled, "toggling missing-value indicators");
        self.detail.set_checkbox(field, enabled).await
    }

    /// Validation message shown for a property, if any
    pub async fn field_error(&self, caption: &str) -> BancadaResult<Option<String>> {
        let index = self
            .detail
            .field_names()
            .await?
            .iter()
            .position(|n| n == caption)
            .ok_or_else(|| bancada::BancadaError::NotFound {
                selector: format!("designer field '{caption}'"),
            })?;
        let found = self
            .page
            .driver()
            .find_all(Self::field_error_locator(index).selector())
            .await?;
        match found.first() {
            Some(handle) => Ok(Some(self.page.driver().text(handle).await?)),
            None => Ok(None),
        }
    }

    /// All validation messages currently shown on the form
    pub async fn validation_errors(&self) -> BancadaResult<Vec<String>> {
        let errors = Self::form()
            .descendant(&Locator::css("div.field-error"))
            .with_strict(false);
        let handles = self.page.driver().find_all(errors.selector()).await?;
        let driver = self.page.driver();
        let mut messages = Vec::with_capacity(handles.len());
        for handle in &handles {
            messages.push(driver.text(handle).await?);
        }
        Ok(messages)
    }

    /// Save the designer form
    pub async fn save(&self) -> BancadaResult<()> {
        self.page.click_button("Save").await
    }
}

#[async_trait::async_trait]
impl PageObject for SampleTypeDesignerPage {
    fn url_pattern(&self) -> UrlMatcher {
        UrlMatcher::Contains("/sampleTypeDesigner".to_string())
    }

    fn page_name(&self) -> &str {
        "sample type designer"
    }

    async fn is_loaded(&self) -> BancadaResult<bool> {
        self.page.lazy(Self::form()).is_displayed().await
    }
}
