//! Modal dialog component.
//!
//! Locators are scoped under the dialog root so a busy page behind the
//! modal never leaks into title, body, or button lookups.

use crate::driver::PageDriver;
use crate::element::LazyElement;
use crate::locator::Locator;
use crate::result::BancadaResult;
use crate::wait::{poll_until_ok, WaitOptions};
use std::sync::Arc;
use tracing::info;

/// Wrapper over one modal dialog
pub struct ModalDialog {
    driver: Arc<dyn PageDriver>,
    root: Locator,
}

impl std::fmt::Debug for ModalDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalDialog")
            .field("root", &self.root.to_selector())
            .finish_non_exhaustive()
    }
}

impl ModalDialog {
    /// Bind to a dialog root element
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, root: Locator) -> Self {
        Self { driver, root }
    }

    /// Bind to the application's default modal container
    #[must_use]
    pub fn default_modal(driver: Arc<dyn PageDriver>) -> Self {
        Self::new(driver, Locator::css("div.modal-dialog"))
    }

    fn lazy(&self, locator: Locator) -> LazyElement {
        LazyElement::new(Arc::clone(&self.driver), locator)
    }

    /// Whether the dialog is currently shown
    pub async fn is_open(&self) -> BancadaResult<bool> {
        let found = self.driver.find_all(self.root.selector()).await?;
        match found.first() {
            Some(handle) => self.driver.is_displayed(handle).await,
            None => Ok(false),
        }
    }

    /// Wait for the dialog to appear
    pub async fn wait_for_open(&self, options: WaitOptions) -> BancadaResult<()> {
        let condition = format!("dialog '{}' to open", self.root);
        poll_until_ok(&condition, options, move || async move {
            self.is_open().await
        })
        .await?;
        Ok(())
    }

    /// Wait for the dialog to go away
    pub async fn wait_for_close(&self, options: WaitOptions) -> BancadaResult<()> {
        let condition = format!("dialog '{}' to close", self.root);
        poll_until_ok(&condition, options, move || async move {
            Ok(!self.is_open().await?)
        })
        .await?;
        Ok(())
    }

    /// Dialog title text
    pub async fn title(&self) -> BancadaResult<String> {
        self.lazy(self.root.clone().descendant(&Locator::css("div.modal-title")))
            .text()
            .await
    }

    /// Dialog body text
    pub async fn body_text(&self) -> BancadaResult<String> {
        self.lazy(self.root.clone().descendant(&Locator::css("div.modal-body")))
            .text()
            .await
    }

    /// Click a dialog button by caption
    pub async fn click_button(&self, caption: &str) -> BancadaResult<()> {
        info!(dialog = %self.root, %caption, "clicking dialog button");
        self.lazy(
            self.root
                .clone()
                .descendant(&Locator::tag("button"))
                .with_text(caption),
        )
        .click()
        .await
    }

    /// Accept the dialog and wait for it to close
    pub async fn confirm(&self, caption: &str, options: WaitOptions) -> BancadaResult<()> {
        self.click_button(caption).await?;
        self.wait_for_close(options).await
    }

    /// Reject the dialog and wait for it to close
    pub async fn dismiss(&self, caption: &str, options: WaitOptions) -> BancadaResult<()> {
        self.click_button(caption).await?;
        self.wait_for_close(options).await
    }
}
