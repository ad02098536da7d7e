//! Detail-form wrapper.
//!
//! [`DetailTableEdit`] reads and writes the caption/value form the
//! application renders for single-record editing. Fields are addressed
//! by visible caption text, so reordering rows in the form does not
//! break callers. The expected markup is a `table` with one
//! `tr.field-row` per field holding a `td.field-caption` and a
//! `td.field-value`; the value cell carries `field-read-only` when the
//! field rejects edits and contains the control (text input, textarea,
//! select, or checkbox).

use crate::driver::PageDriver;
use crate::element::LazyElement;
use crate::event::{Key, KeyChord};
use crate::locator::Locator;
use crate::result::{BancadaError, BancadaResult};
use std::sync::Arc;
use tracing::info;

/// Class marking a value cell as read-only
const FIELD_READ_ONLY_CLASS: &str = "field-read-only";

/// Control kind found in a field's value cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text input
    Text,
    /// Multi-line textarea
    TextArea,
    /// Dropdown select
    Select,
    /// Checkbox input
    Checkbox,
}

/// Wrapper over one caption-keyed detail form
pub struct DetailTableEdit {
    driver: Arc<dyn PageDriver>,
    root: Locator,
}

impl std::fmt::Debug for DetailTableEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailTableEdit")
            .field("root", &self.root.to_selector())
            .finish_non_exhaustive()
    }
}

impl DetailTableEdit {
    /// Bind to the form's root element
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, root: Locator) -> Self {
        Self { driver, root }
    }

    fn lazy(&self, locator: Locator) -> LazyElement {
        LazyElement::new(Arc::clone(&self.driver), locator)
    }

    fn caption_locator(&self) -> Locator {
        self.root
            .clone()
            .descendant(&Locator::css("td.field-caption"))
            .with_strict(false)
    }

    fn value_cell_locator(&self, index: usize) -> Locator {
        self.root
            .clone()
            .descendant(&Locator::css("tr.field-row").index(index))
            .descendant(&Locator::css("td.field-value"))
    }

    /// Visible captions, top to bottom
    pub async fn field_names(&self) -> BancadaResult<Vec<String>> {
        let captions = self
            .driver
            .find_all(self.caption_locator().selector())
            .await?;
        let mut names = Vec::with_capacity(captions.len());
        for caption in &captions {
            names.push(self.driver.text(caption).await?);
        }
        Ok(names)
    }

    async fn field_index(&self, caption: &str) -> BancadaResult<usize> {
        self.field_names()
            .await?
            .iter()
            .position(|n| n == caption)
            .ok_or_else(|| BancadaError::NotFound {
                selector: format!("detail field '{caption}'"),
            })
    }

    async fn control(&self, index: usize) -> BancadaResult<(FieldKind, LazyElement)> {
        for (tag, kind) in [
            ("textarea", FieldKind::TextArea),
            ("select", FieldKind::Select),
            ("input", FieldKind::Text),
        ] {
            let locator = self.value_cell_locator(index).descendant(&Locator::tag(tag));
            let found = self.driver.find_all(locator.selector()).await?;
            if let Some(handle) = found.first() {
                let kind = if kind == FieldKind::Text
                    && self.driver.attribute(handle, "type").await?.as_deref()
                        == Some("checkbox")
                {
                    FieldKind::Checkbox
                } else {
                    kind
                };
                return Ok((kind, self.lazy(locator)));
            }
        }
        Err(BancadaError::NotFound {
            selector: format!("control in detail field row {index}"),
        })
    }

    /// Control kind of a field
    pub async fn field_kind(&self, caption: &str) -> BancadaResult<FieldKind> {
        let index = self.field_index(caption).await?;
        Ok(self.control(index).await?.0)
    }

    /// Whether the field rejects edits
    pub async fn is_read_only(&self, caption: &str) -> BancadaResult<bool> {
        let index = self.field_index(caption).await?;
        let classes = self.lazy(self.value_cell_locator(index)).classes().await?;
        Ok(classes.iter().any(|c| c == FIELD_READ_ONLY_CLASS))
    }

    async fn require_editable(&self, caption: &str) -> BancadaResult<usize> {
        let index = self.field_index(caption).await?;
        let classes = self.lazy(self.value_cell_locator(index)).classes().await?;
        if classes.iter().any(|c| c == FIELD_READ_ONLY_CLASS) {
            return Err(BancadaError::precondition(format!(
                "detail field '{caption}' is read-only"
            )));
        }
        Ok(index)
    }

    /// Current value of a field.
    ///
    /// Text inputs report their `value` attribute, checkboxes "true" or
    /// "false", textareas and selects their visible text.
    pub async fn field_value(&self, caption: &str) -> BancadaResult<String> {
        let index = self.field_index(caption).await?;
        let (kind, control) = self.control(index).await?;
        match kind {
            FieldKind::Text => Ok(control.attribute("value").await?.unwrap_or_default()),
            FieldKind::Checkbox => {
                let checked = control.attribute("checked").await?.as_deref() == Some("true");
                Ok(checked.to_string())
            }
            FieldKind::TextArea | FieldKind::Select => control.text().await,
        }
    }

    /// Replace the text of an editable text input or textarea
    pub async fn set_text_field(&self, caption: &str, value: &str) -> BancadaResult<()> {
        let index = self.require_editable(caption).await?;
        let (kind, control) = self.control(index).await?;
        if !matches!(kind, FieldKind::Text | FieldKind::TextArea) {
            return Err(BancadaError::precondition(format!(
                "detail field '{caption}' is not a text field"
            )));
        }
        info!(field = caption, %value, "setting detail text field");
        control.click().await?;
        control.press_key(KeyChord::plain(Key::Backspace)).await?;
        control.type_text(value).await
    }

    /// Check or uncheck an editable checkbox field
    pub async fn set_checkbox(&self, caption: &str, checked: bool) -> BancadaResult<()> {
        let index = self.require_editable(caption).await?;
        let (kind, control) = self.control(index).await?;
        if kind != FieldKind::Checkbox {
            return Err(BancadaError::precondition(format!(
                "detail field '{caption}' is not a checkbox"
            )));
        }
        let current = control.attribute("checked").await?.as_deref() == Some("true");
        if current != checked {
            info!(field = caption, checked, "toggling detail checkbox");
            control.click().await?;
        }
        Ok(())
    }

    /// Pick an option from an editable select field by visible label
    pub async fn select_option(&self, caption: &str, label: &str) -> BancadaResult<()> {
        let index = self.require_editable(caption).await?;
        let (kind, control) = self.control(index).await?;
        if kind != FieldKind::Select {
            return Err(BancadaError::precondition(format!(
                "detail field '{caption}' is not a select"
            )));
        }
        info!(field = caption, %label, "selecting detail option");
        control.click().await?;
        let option = self.lazy(
            self.value_cell_locator(index)
                .descendant(&Locator::tag("option"))
                .with_text(label),
        );
        option.click().await
    }
}
