//! Editable-grid wrapper.
//!
//! [`EditableGrid`] drives the spreadsheet-style grid the application
//! uses for sample and assay data entry: cells addressed by (row index,
//! column caption), keyboard-first editing (click, clear, type, Enter),
//! lookup columns through a filtered option list, keyboard range
//! selection, and clipboard paste emulation. Column captions are mapped
//! to indexes through a cache that re-reads the header row whenever the
//! live header count changes, so column add/remove during a test never
//! leaves the wrapper addressing the wrong column.

use crate::cell::{CellClassNames, CellState};
use crate::driver::PageDriver;
use crate::element::{resolve_all, LazyElement};
use crate::event::{Key, KeyChord};
use crate::locator::Locator;
use crate::result::{BancadaError, BancadaResult};
use crate::wait::{poll_until_ok, WaitOptions};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Header caption of the row-selection checkbox column
pub const SELECT_COLUMN_NAME: &str = "<select>";

/// Class the application puts on read-only row containers
const ROW_READ_ONLY_CLASS: &str = "row-read-only";

/// A value to write into a grid cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Free text
    Text(String),
    /// Integer, stringified for typing
    Int(i64),
    /// Floating point, stringified for typing
    Float(f64),
    /// Label to pick from a lookup column's option list
    Lookup(String),
    /// ISO date for picker-backed columns
    Date(String),
    /// ISO date and time for picker-backed columns
    DateTime(String),
}

impl CellValue {
    /// The text this value is typed (or matched) as
    #[must_use]
    pub fn to_input_string(&self) -> String {
        match self {
            Self::Text(s) | Self::Lookup(s) | Self::Date(s) | Self::DateTime(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<chrono::NaiveDate> for CellValue {
    fn from(d: chrono::NaiveDate) -> Self {
        Self::Date(d.format("%Y-%m-%d").to_string())
    }
}

impl From<chrono::NaiveDateTime> for CellValue {
    fn from(dt: chrono::NaiveDateTime) -> Self {
        Self::DateTime(dt.format("%Y-%m-%d %H:%M").to_string())
    }
}

/// How the post-write convergence check compares cell text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueMatch {
    /// Cell text must contain the stringified value
    #[default]
    Contains,
    /// Cell text must equal the stringified value
    Exact,
}

impl ValueMatch {
    fn verb(self) -> &'static str {
        match self {
            Self::Contains => "contain",
            Self::Exact => "equal",
        }
    }

    fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Contains => actual.contains(expected),
            Self::Exact => actual == expected,
        }
    }
}

/// Split a clipboard block into rows of cell values.
///
/// Rows are newline-separated (a single trailing newline is tolerated,
/// CRLF accepted), cells tab-separated.
#[must_use]
pub fn parse_paste_block(block: &str) -> Vec<Vec<String>> {
    let mut lines: Vec<&str> = block
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    if lines.last() == Some(&"") {
        let _ = lines.pop();
    }
    lines
        .iter()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

/// Wrapper over one editable grid on the current page
pub struct EditableGrid {
    driver: Arc<dyn PageDriver>,
    root: Locator,
    class_names: CellClassNames,
    columns: Mutex<Option<Vec<String>>>,
}

impl std::fmt::Debug for EditableGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditableGrid")
            .field("root", &self.root.to_selector())
            .finish_non_exhaustive()
    }
}

impl EditableGrid {
    /// Bind a grid wrapper to the grid root element
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, root: Locator) -> Self {
        Self {
            driver,
            root,
            class_names: CellClassNames::default(),
            columns: Mutex::new(None),
        }
    }

    /// Override the cell state class vocabulary
    #[must_use]
    pub fn with_class_names(mut self, class_names: CellClassNames) -> Self {
        self.class_names = class_names;
        self
    }

    fn lazy(&self, locator: Locator) -> LazyElement {
        LazyElement::new(Arc::clone(&self.driver), locator)
    }

    fn header_locator(&self) -> Locator {
        self.root
            .clone()
            .descendant(&Locator::tag("thead"))
            .descendant(&Locator::tag("th"))
            .with_strict(false)
    }

    fn row_locator(&self, row: usize) -> Locator {
        self.root
            .clone()
            .descendant(&Locator::tag("tbody"))
            .descendant(&Locator::tag("tr").index(row))
    }

    fn cell_locator(&self, row: usize, col: usize) -> Locator {
        self.row_locator(row).descendant(&Locator::tag("td").index(col))
    }

    fn editor_locator(&self, row: usize, col: usize) -> Locator {
        self.cell_locator(row, col)
            .descendant(&Locator::css("input.cell-editor"))
    }

    fn picker_locator(&self, row: usize, col: usize) -> Locator {
        self.cell_locator(row, col)
            .descendant(&Locator::css("input.date-editor"))
    }

    /// Current column captions, left to right.
    ///
    /// The caption list is cached; whenever the live header count
    /// differs from the cached count the cache is rebuilt, so callers
    /// always see one caption per live header.
    pub async fn column_names(&self) -> BancadaResult<Vec<String>> {
        let headers = resolve_all(self.driver.as_ref(), &self.header_locator()).await?;
        {
            let cache = self.columns.lock().unwrap();
            if let Some(cached) = cache.as_ref() {
                if cached.len() == headers.len() {
                    return Ok(cached.clone());
                }
            }
        }
        debug!(count = headers.len(), "rebuilding grid column cache");
        let mut names = Vec::with_capacity(headers.len());
        for header in &headers {
            names.push(self.driver.text(header).await?);
        }
        *self.columns.lock().unwrap() = Some(names.clone());
        Ok(names)
    }

    /// Index of the column with the given caption
    pub async fn column_index(&self, name: &str) -> BancadaResult<usize> {
        self.column_names()
            .await?
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| BancadaError::NotFound {
                selector: format!("grid column '{name}'"),
            })
    }

    /// Number of data rows currently rendered
    pub async fn row_count(&self) -> BancadaResult<usize> {
        let rows = self
            .root
            .clone()
            .descendant(&Locator::tag("tbody"))
            .descendant(&Locator::tag("tr"));
        Ok(resolve_all(self.driver.as_ref(), &rows).await?.len())
    }

    /// Whether the row rejects edits (sentinel class on the row element)
    pub async fn is_row_read_only(&self, row: usize) -> BancadaResult<bool> {
        let classes = self.lazy(self.row_locator(row)).classes().await?;
        Ok(classes.iter().any(|c| c == ROW_READ_ONLY_CLASS))
    }

    /// Wait until the grid's loading spinner is gone
    pub async fn wait_for_loaded(&self, options: WaitOptions) -> BancadaResult<()> {
        let spinner = self
            .root
            .clone()
            .descendant(&Locator::css("div.grid-spinner"));
        let spinner = &spinner;
        poll_until_ok("grid spinner to disappear", options, move || async move {
            let found = resolve_all(self.driver.as_ref(), spinner).await?;
            match found.first() {
                None => Ok(true),
                Some(handle) => Ok(!self.driver.is_displayed(handle).await?),
            }
        })
        .await?;
        Ok(())
    }

    /// Committed text of a cell
    pub async fn cell_value(&self, row: usize, column: &str) -> BancadaResult<String> {
        let col = self.column_index(column).await?;
        self.lazy(self.cell_locator(row, col)).text().await
    }

    /// Interaction state of a cell
    pub async fn cell_state(&self, row: usize, column: &str) -> BancadaResult<CellState> {
        let col = self.column_index(column).await?;
        let classes = self.lazy(self.cell_locator(row, col)).classes().await?;
        Ok(self.class_names.classify(&classes))
    }

    /// Validation message attached to a cell, if any
    pub async fn cell_error(&self, row: usize, column: &str) -> BancadaResult<Option<String>> {
        let col = self.column_index(column).await?;
        let cell = self.lazy(self.cell_locator(row, col));
        if !self.class_names.has_warning(&cell.classes().await?) {
            return Ok(None);
        }
        cell.attribute("data-warning").await
    }

    /// Text of the validation popover for the active cell, if shown
    pub async fn cell_popover_text(&self) -> BancadaResult<Option<String>> {
        let popovers = resolve_all(self.driver.as_ref(), &Locator::css("div.cell-popover")).await?;
        match popovers.first() {
            Some(handle) => Ok(Some(self.driver.text(handle).await?)),
            None => Ok(None),
        }
    }

    /// Click a cell, making it the selection anchor
    pub async fn select_cell(&self, row: usize, column: &str) -> BancadaResult<()> {
        let col = self.column_index(column).await?;
        self.lazy(self.cell_locator(row, col)).click().await
    }

    /// Extend the selection from an anchor cell to a far corner using
    /// keyboard range selection (Shift+arrows).
    pub async fn select_range(
        &self,
        from: (usize, &str),
        to: (usize, &str),
    ) -> BancadaResult<()> {
        let from_col = self.column_index(from.1).await?;
        let to_col = self.column_index(to.1).await?;
        info!(
            from_row = from.0,
            from_column = from.1,
            to_row = to.0,
            to_column = to.1,
            "selecting cell range"
        );
        self.select_cell(from.0, from.1).await?;

        let anchor = self.lazy(self.cell_locator(from.0, from_col));
        let (vertical, v_steps) = if to.0 >= from.0 {
            (Key::ArrowDown, to.0 - from.0)
        } else {
            (Key::ArrowUp, from.0 - to.0)
        };
        let (horizontal, h_steps) = if to_col >= from_col {
            (Key::ArrowRight, to_col - from_col)
        } else {
            (Key::ArrowLeft, from_col - to_col)
        };
        for _ in 0..v_steps {
            anchor.press_key(KeyChord::shift(vertical)).await?;
        }
        for _ in 0..h_steps {
            anchor.press_key(KeyChord::shift(horizontal)).await?;
        }
        Ok(())
    }

    /// Drop any multi-cell selection (Escape at the grid root)
    pub async fn clear_selection(&self) -> BancadaResult<()> {
        self.lazy(self.root.clone())
            .press_key(KeyChord::plain(Key::Escape))
            .await
    }

    async fn checkbox_checked(&self, checkbox: &LazyElement) -> BancadaResult<bool> {
        Ok(checkbox.attribute("checked").await?.as_deref() == Some("true"))
    }

    /// Check or uncheck the select-all header checkbox.
    ///
    /// Clicks only when the current state differs from the requested
    /// one, so the call is idempotent.
    pub async fn select_all(&self, selected: bool) -> BancadaResult<()> {
        let checkbox = self.lazy(
            self.root
                .clone()
                .descendant(&Locator::tag("thead"))
                .descendant(&Locator::css("input[type='checkbox']")),
        );
        if self.checkbox_checked(&checkbox).await? != selected {
            info!(selected, "toggling select-all checkbox");
            checkbox.click().await?;
        }
        Ok(())
    }

    /// Whether every row's selection checkbox is checked
    pub async fn are_all_rows_selected(&self) -> BancadaResult<bool> {
        let select_col = self.column_index(SELECT_COLUMN_NAME).await?;
        for row in 0..self.row_count().await? {
            let checkbox = self.lazy(
                self.cell_locator(row, select_col)
                    .descendant(&Locator::css("input[type='checkbox']")),
            );
            if !self.checkbox_checked(&checkbox).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Write a value into a cell and wait for the grid to show it.
    ///
    /// Uses [`ValueMatch::Contains`]; lookup columns match the selected
    /// label. Non-convergence within the short cell budget is a
    /// [`BancadaError::Timeout`].
    pub async fn set_cell_value(
        &self,
        row: usize,
        column: &str,
        value: impl Into<CellValue>,
    ) -> BancadaResult<()> {
        self.set_cell_value_with(row, column, value, ValueMatch::Contains)
            .await
    }

    /// Write a value into a cell with an explicit convergence mode
    pub async fn set_cell_value_with(
        &self,
        row: usize,
        column: &str,
        value: impl Into<CellValue>,
        mode: ValueMatch,
    ) -> BancadaResult<()> {
        let value = value.into();
        let col = self.column_index(column).await?;
        let expected = value.to_input_string();
        info!(row, column, value = %expected, "setting cell value");

        self.lazy(self.cell_locator(row, col)).click().await?;
        match value {
            CellValue::Lookup(ref label) => {
                let editor = self.lazy(self.editor_locator(row, col));
                editor.press_key(KeyChord::plain(Key::Backspace)).await?;
                editor.type_text(&expected).await?;
                let option = self.lazy(
                    Locator::css("div.select-options div.select-option")
                        .with_text(label.clone()),
                );
                option.click().await?;
            }
            CellValue::Date(_) | CellValue::DateTime(_) => {
                let picker = self.lazy(self.picker_locator(row, col));
                picker.press_key(KeyChord::plain(Key::Backspace)).await?;
                picker.type_text(&expected).await?;
                picker.press_key(KeyChord::plain(Key::Enter)).await?;
            }
            _ => {
                let editor = self.lazy(self.editor_locator(row, col));
                editor.press_key(KeyChord::plain(Key::Backspace)).await?;
                editor.type_text(&expected).await?;
                editor.press_key(KeyChord::plain(Key::Enter)).await?;
            }
        }

        let condition = format!(
            "cell ({row}, {column}) text to {} '{expected}'",
            mode.verb()
        );
        let cell = self.cell_locator(row, col);
        let (cell, expected) = (&cell, &expected);
        poll_until_ok(&condition, WaitOptions::short(), move || async move {
            let text = self.lazy(cell.clone()).text().await?;
            Ok(mode.matches(&text, expected))
        })
        .await?;
        Ok(())
    }

    /// Paste a raw clipboard block at an anchor cell and wait for the
    /// grid to absorb it.
    ///
    /// The application redistributes the block by its own rules; the
    /// wrapper polls until the anchor cell shows the block's first value
    /// and the row count covers the pasted lines.
    pub async fn paste_from_cell(
        &self,
        row: usize,
        column: &str,
        block: &str,
    ) -> BancadaResult<()> {
        let col = self.column_index(column).await?;
        let parsed = parse_paste_block(block);
        let Some(first) = parsed.first().and_then(|r| r.first()).cloned() else {
            return Err(BancadaError::precondition("paste block is empty"));
        };
        info!(row, column, lines = parsed.len(), "pasting block");

        let anchor = self.lazy(self.cell_locator(row, col));
        anchor.click().await?;
        anchor.paste(block).await?;

        let needed_rows = row + parsed.len();
        let condition = format!(
            "pasted block to appear at ({row}, {column}) spanning {} row(s)",
            parsed.len()
        );
        let cell = self.cell_locator(row, col);
        let (cell, first) = (&cell, &first);
        poll_until_ok(&condition, WaitOptions::short(), move || async move {
            if self.row_count().await? < needed_rows {
                return Ok(false);
            }
            let text = self.lazy(cell.clone()).text().await?;
            Ok(text.contains(first.as_str()))
        })
        .await?;
        Ok(())
    }

    /// Paste a grid of values starting at an anchor cell
    pub async fn paste_multiple_cells(
        &self,
        row: usize,
        column: &str,
        values: &[Vec<String>],
    ) -> BancadaResult<()> {
        let block = values
            .iter()
            .map(|r| r.join("\t"))
            .collect::<Vec<_>>()
            .join("\n");
        self.paste_from_cell(row, column, &block).await
    }
}
