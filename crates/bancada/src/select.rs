//! Typeahead combo box component.
//!
//! The widget is an input that opens a floating option list
//! (`div.select-options` holding `div.select-option` entries, rendered
//! at document level so it can overflow its container). Filtering is
//! done by typing into the input; the application narrows the list.

use crate::driver::PageDriver;
use crate::element::{resolve_all, LazyElement};
use crate::event::{Key, KeyChord};
use crate::locator::Locator;
use crate::result::BancadaResult;
use crate::wait::{poll_until_ok, WaitOptions};
use std::sync::Arc;
use tracing::info;

/// Wrapper over one typeahead combo box
pub struct ComboBox {
    driver: Arc<dyn PageDriver>,
    root: Locator,
}

impl std::fmt::Debug for ComboBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComboBox")
            .field("root", &self.root.to_selector())
            .finish_non_exhaustive()
    }
}

impl ComboBox {
    /// Bind to the combo's root element
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, root: Locator) -> Self {
        Self { driver, root }
    }

    fn lazy(&self, locator: Locator) -> LazyElement {
        LazyElement::new(Arc::clone(&self.driver), locator)
    }

    fn input(&self) -> LazyElement {
        self.lazy(self.root.clone().descendant(&Locator::tag("input")))
    }

    fn options_locator() -> Locator {
        Locator::css("div.select-options div.select-option").with_strict(false)
    }

    /// Open the option list
    pub async fn open(&self) -> BancadaResult<()> {
        self.input().click().await
    }

    /// Narrow the option list by typing into the input
    pub async fn filter(&self, text: &str) -> BancadaResult<()> {
        info!(combo = %self.root, %text, "filtering combo options");
        self.input().type_text(text).await
    }

    /// Labels currently shown in the option list
    pub async fn visible_options(&self) -> BancadaResult<Vec<String>> {
        let handles = resolve_all(self.driver.as_ref(), &Self::options_locator()).await?;
        let mut labels = Vec::with_capacity(handles.len());
        for handle in &handles {
            labels.push(self.driver.text(handle).await?);
        }
        Ok(labels)
    }

    /// Pick the option with the given label, waiting for it to appear
    pub async fn select_option(&self, label: &str, options: WaitOptions) -> BancadaResult<()> {
        info!(combo = %self.root, %label, "selecting combo option");
        let condition = format!("combo option '{label}' to be listed");
        poll_until_ok(&condition, options, move || async move {
            Ok(self
                .visible_options()
                .await?
                .iter()
                .any(|o| o.as_str() == label))
        })
        .await?;
        self.lazy(Self::options_locator().with_text(label).with_strict(true))
            .click()
            .await
    }

    /// The label currently held by the input
    pub async fn selected_label(&self) -> BancadaResult<String> {
        Ok(self.input().attribute("value").await?.unwrap_or_default())
    }

    /// Clear the input
    pub async fn clear(&self) -> BancadaResult<()> {
        let input = self.input();
        input.click().await?;
        input.press_key(KeyChord::plain(Key::Backspace)).await
    }

    /// Open, filter by the label, then pick it once listed
    pub async fn pick(&self, label: &str, options: WaitOptions) -> BancadaResult<()> {
        self.open().await?;
        self.filter(label).await?;
        self.select_option(label, options).await
    }
}
