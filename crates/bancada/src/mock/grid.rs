//! Fake editable-grid application model.
//!
//! `FakeGrid` renders the same markup contract the real application
//! exposes (see the class-name table in [`crate::cell`]) and reacts to
//! gestures: clicking a cell opens its editor, Enter commits, paste
//! redistributes the delimited block and grows the row set, lookup
//! columns open an option list. This is what makes the grid wrapper's
//! scenario contracts executable without a browser.

use crate::event::{Key, KeyChord, Modifier};
use crate::mock::dom::{MockDom, MockNode};
use crate::mock::driver::FakeApp;
use std::any::Any;
use std::collections::{HashMap, HashSet};

/// Column kind of the fake grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeColumnKind {
    /// Row-selection checkbox column (rendered as `<select>`)
    Select,
    /// Free text
    Text,
    /// Integer with commit-time validation
    Integer,
    /// Lookup backed by a fixed option list
    Lookup(Vec<String>),
    /// Date in ISO format, edited through a picker input
    Date,
    /// Date and time in ISO format, edited through a picker input
    DateTime,
}

impl FakeColumnKind {
    const fn uses_picker(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }
}

/// A column of the fake grid
#[derive(Debug, Clone)]
pub struct FakeColumn {
    /// Header caption
    pub name: String,
    /// Value kind
    pub kind: FakeColumnKind,
    /// Whether cells in this column reject edits
    pub read_only: bool,
}

impl FakeColumn {
    /// An editable column
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FakeColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            read_only: false,
        }
    }

    /// The row-selection checkbox column
    #[must_use]
    pub fn select() -> Self {
        Self::new("<select>", FakeColumnKind::Select)
    }

    /// Mark the column read-only
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Scriptable grid application behind [`crate::mock::MockDriver`]
#[derive(Debug)]
pub struct FakeGrid {
    columns: Vec<FakeColumn>,
    rows: Vec<Vec<String>>,
    row_checked: Vec<bool>,
    read_only_rows: HashSet<usize>,
    active: Option<(usize, usize)>,
    editing: bool,
    pending: String,
    lookup_open: bool,
    selection_extent: Option<(usize, usize)>,
    in_selection: HashSet<(usize, usize)>,
    warnings: HashMap<(usize, usize), String>,
    loading: bool,
}

impl FakeGrid {
    /// Create a grid with columns and initial row data.
    ///
    /// Each row must have one value per column; the select column's
    /// value is ignored.
    #[must_use]
    pub fn new(columns: Vec<FakeColumn>, rows: Vec<Vec<String>>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_checked: vec![false; row_count],
            read_only_rows: HashSet::new(),
            active: None,
            editing: false,
            pending: String::new(),
            lookup_open: false,
            selection_extent: None,
            in_selection: HashSet::new(),
            warnings: HashMap::new(),
            loading: false,
        }
    }

    /// Mark a row read-only
    pub fn set_row_read_only(&mut self, row: usize) {
        let _ = self.read_only_rows.insert(row);
    }

    /// Toggle the loading spinner
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Add a column at the end (all rows get an empty cell)
    pub fn add_column(&mut self, column: FakeColumn) {
        self.columns.push(column);
        for row in &mut self.rows {
            row.push(String::new());
        }
    }

    /// Remove a column by caption
    pub fn remove_column(&mut self, name: &str) {
        if let Some(idx) = self.columns.iter().position(|c| c.name == name) {
            let _ = self.columns.remove(idx);
            for row in &mut self.rows {
                if idx < row.len() {
                    let _ = row.remove(idx);
                }
            }
        }
    }

    /// Committed cell text (test inspection)
    #[must_use]
    pub fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Number of data rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_editable(&self, row: usize, col: usize) -> bool {
        let col_ok = self
            .columns
            .get(col)
            .is_some_and(|c| !c.read_only && c.kind != FakeColumnKind::Select);
        col_ok && !self.read_only_rows.contains(&row)
    }

    fn visible_options(&self) -> Vec<String> {
        let Some((_, col)) = self.active else {
            return Vec::new();
        };
        let Some(FakeColumnKind::Lookup(options)) = self.columns.get(col).map(|c| &c.kind)
        else {
            return Vec::new();
        };
        options
            .iter()
            .filter(|o| {
                self.pending.is_empty()
                    || o.to_lowercase().contains(&self.pending.to_lowercase())
            })
            .cloned()
            .collect()
    }

    fn commit_pending(&mut self) {
        let Some((row, col)) = self.active else {
            return;
        };
        let value = self.pending.clone();
        let _ = self.warnings.remove(&(row, col));
        match self.columns.get(col).map(|c| &c.kind) {
            Some(FakeColumnKind::Integer) => {
                if !value.is_empty() && value.parse::<i64>().is_err() {
                    let _ = self
                        .warnings
                        .insert((row, col), format!("Invalid integer value: {value}"));
                }
            }
            Some(FakeColumnKind::Date) => {
                if !value.is_empty()
                    && chrono::NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_err()
                {
                    let _ = self
                        .warnings
                        .insert((row, col), format!("Invalid date value: {value}"));
                }
            }
            Some(FakeColumnKind::DateTime) => {
                if !value.is_empty()
                    && chrono::NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M").is_err()
                {
                    let _ = self
                        .warnings
                        .insert((row, col), format!("Invalid date/time value: {value}"));
                }
            }
            _ => {}
        }
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
        self.editing = false;
        self.lookup_open = false;
    }

    fn extend_selection(&mut self, key: Key) {
        let Some(anchor) = self.active else {
            return;
        };
        let (mut er, mut ec) = self.selection_extent.unwrap_or(anchor);
        match key {
            Key::ArrowDown => er = (er + 1).min(self.rows.len().saturating_sub(1)),
            Key::ArrowUp => er = er.saturating_sub(1),
            Key::ArrowRight => ec = (ec + 1).min(self.columns.len().saturating_sub(1)),
            Key::ArrowLeft => ec = ec.saturating_sub(1),
            _ => return,
        }
        self.selection_extent = Some((er, ec));
        self.in_selection.clear();
        let (r0, r1) = (anchor.0.min(er), anchor.0.max(er));
        let (c0, c1) = (anchor.1.min(ec), anchor.1.max(ec));
        for r in r0..=r1 {
            for c in c0..=c1 {
                let _ = self.in_selection.insert((r, c));
            }
        }
    }

    fn apply_paste(&mut self, row: usize, col: usize, block: &str) {
        let lines: Vec<&str> = block
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        let lines = if lines.last() == Some(&"") {
            &lines[..lines.len() - 1]
        } else {
            &lines[..]
        };
        for (i, line) in lines.iter().enumerate() {
            let target_row = row + i;
            while target_row >= self.rows.len() {
                self.rows.push(vec![String::new(); self.columns.len()]);
                self.row_checked.push(false);
            }
            for (j, value) in line.split('\t').enumerate() {
                let target_col = col + j;
                if target_col >= self.columns.len() {
                    break;
                }
                if self.cell_editable(target_row, target_col) {
                    self.rows[target_row][target_col] = value.to_string();
                }
            }
        }
    }
}

impl FakeApp for FakeGrid {
    fn render(&mut self, dom: &mut MockDom) {
        dom.insert_root(MockNode::new("grid", "div").with_class("editable-grid"));
        dom.insert_child(
            "grid",
            MockNode::new("grid-spinner", "div")
                .with_class("grid-spinner")
                .with_displayed(self.loading),
        );
        dom.insert_child("grid", MockNode::new("grid-table", "table"));
        dom.insert_child("grid-table", MockNode::new("grid-thead", "thead"));
        dom.insert_child("grid-thead", MockNode::new("grid-hrow", "tr"));
        for (c, column) in self.columns.iter().enumerate() {
            dom.insert_child(
                "grid-hrow",
                MockNode::new(format!("hdr-{c}"), "th").with_text(&column.name),
            );
            if column.kind == FakeColumnKind::Select {
                let all = !self.row_checked.is_empty() && self.row_checked.iter().all(|&b| b);
                let mut cb = MockNode::new("selectall", "input").with_attr("type", "checkbox");
                if all {
                    cb = cb.with_attr("checked", "true");
                }
                dom.insert_child(&format!("hdr-{c}"), cb);
            }
        }
        dom.insert_child("grid-table", MockNode::new("grid-tbody", "tbody"));
        for (r, row) in self.rows.iter().enumerate() {
            let row_id = format!("row-{r}");
            let mut tr = MockNode::new(&row_id, "tr").with_class("grid-row");
            if self.read_only_rows.contains(&r) {
                tr = tr.with_class("row-read-only");
            }
            dom.insert_child("grid-tbody", tr);
            for (c, value) in row.iter().enumerate() {
                let cell_id = format!("cell-{r}-{c}");
                let mut td = MockNode::new(&cell_id, "td").with_class("cell");
                if self.active == Some((r, c)) {
                    td = td.with_class("cell-selected");
                }
                if self.in_selection.contains(&(r, c)) {
                    td = td.with_class("cell-selection");
                }
                if !self.cell_editable(r, c) {
                    td = td.with_class("cell-read-only");
                }
                if let Some(warning) = self.warnings.get(&(r, c)) {
                    td = td.with_class("cell-warning").with_attr("data-warning", warning);
                }
                let is_select_col = self
                    .columns
                    .get(c)
                    .is_some_and(|col| col.kind == FakeColumnKind::Select);
                if !is_select_col {
                    td = td.with_text(value);
                }
                dom.insert_child(&row_id, td);
                if is_select_col {
                    let mut cb = MockNode::new(format!("rowcheck-{r}"), "input")
                        .with_attr("type", "checkbox");
                    if self.row_checked.get(r).copied().unwrap_or(false) {
                        cb = cb.with_attr("checked", "true");
                    }
                    dom.insert_child(&cell_id, cb);
                } else if self.editing && self.active == Some((r, c)) {
                    let picker = self
                        .columns
                        .get(c)
                        .is_some_and(|col| col.kind.uses_picker());
                    let editor = if picker {
                        MockNode::new(format!("dateinput-{r}-{c}"), "input")
                            .with_class("date-editor")
                    } else {
                        MockNode::new(format!("cellinput-{r}-{c}"), "input")
                            .with_class("cell-editor")
                    };
                    dom.insert_child(&cell_id, editor.with_attr("value", &self.pending));
                }
            }
        }
        if self.lookup_open {
            dom.insert_child(
                "grid",
                MockNode::new("grid-options", "div").with_class("select-options"),
            );
            for (i, option) in self.visible_options().iter().enumerate() {
                dom.insert_child(
                    "grid-options",
                    MockNode::new(format!("opt-{i}"), "div")
                        .with_class("select-option")
                        .with_text(option),
                );
            }
        }
        if let Some((r, c)) = self.active {
            if let Some(warning) = self.warnings.get(&(r, c)) {
                dom.insert_root(
                    MockNode::new("grid-popover", "div")
                        .with_class("cell-popover")
                        .with_text(warning),
                );
            }
        }
    }

    fn on_click(&mut self, target_id: &str) {
        if target_id == "selectall" {
            let all = !self.row_checked.is_empty() && self.row_checked.iter().all(|&b| b);
            for checked in &mut self.row_checked {
                *checked = !all;
            }
            return;
        }
        if let Some(r) = parse_id(target_id, "rowcheck-") {
            if let Some(checked) = self.row_checked.get_mut(r) {
                *checked = !*checked;
            }
            return;
        }
        if let Some(i) = parse_id(target_id, "opt-") {
            if let Some(label) = self.visible_options().get(i).cloned() {
                self.pending = label;
                self.commit_pending();
            }
            return;
        }
        if let Some((r, c)) = parse_cell_id(target_id, "cell-") {
            if self.editing {
                self.commit_pending();
            }
            self.active = Some((r, c));
            self.selection_extent = None;
            self.in_selection.clear();
            if self.cell_editable(r, c) {
                self.editing = true;
                self.pending = self.rows[r][c].clone();
                self.lookup_open = matches!(
                    self.columns.get(c).map(|col| &col.kind),
                    Some(FakeColumnKind::Lookup(_))
                );
            } else {
                self.editing = false;
                self.lookup_open = false;
            }
        }
    }

    fn on_type(&mut self, target_id: &str, text: &str) {
        let editor = parse_cell_id(target_id, "cellinput-")
            .or_else(|| parse_cell_id(target_id, "dateinput-"));
        if editor.is_some() && self.editing {
            self.pending.push_str(text);
        }
    }

    fn on_key(&mut self, _target_id: &str, chord: &KeyChord) {
        if chord.modifiers.contains(&Modifier::Shift) {
            self.extend_selection(chord.key);
            return;
        }
        match chord.key {
            Key::Backspace => self.pending.clear(),
            Key::Enter => self.commit_pending(),
            Key::Escape => {
                self.editing = false;
                self.lookup_open = false;
                self.in_selection.clear();
                self.selection_extent = None;
            }
            _ => {}
        }
    }

    fn on_paste(&mut self, target_id: &str, block: &str) {
        let target = parse_cell_id(target_id, "cell-")
            .or_else(|| parse_cell_id(target_id, "cellinput-"));
        if let Some((r, c)) = target {
            self.editing = false;
            self.apply_paste(r, c, block);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn parse_id(id: &str, prefix: &str) -> Option<usize> {
    id.strip_prefix(prefix)?.parse().ok()
}

fn parse_cell_id(id: &str, prefix: &str) -> Option<(usize, usize)> {
    let rest = id.strip_prefix(prefix)?;
    let (r, c) = rest.split_once('-')?;
    Some((r.parse().ok()?, c.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FakeGrid {
        FakeGrid::new(
            vec![
                FakeColumn::select(),
                FakeColumn::new("Name", FakeColumnKind::Text),
                FakeColumn::new("Age", FakeColumnKind::Integer),
            ],
            vec![
                vec![String::new(), "Ada".into(), "36".into()],
                vec![String::new(), "Grace".into(), "45".into()],
                vec![String::new(), "Edsger".into(), "72".into()],
            ],
        )
    }

    #[test]
    fn test_click_then_type_then_enter_commits() {
        let mut grid = sample();
        grid.on_click("cell-0-2");
        grid.on_key("cellinput-0-2", &KeyChord::plain(Key::Backspace));
        grid.on_type("cellinput-0-2", "17");
        grid.on_key("cellinput-0-2", &KeyChord::plain(Key::Enter));
        assert_eq!(grid.cell_text(0, 2), Some("17"));
    }

    #[test]
    fn test_integer_validation_sets_warning() {
        let mut grid = sample();
        grid.on_click("cell-0-2");
        grid.on_key("cellinput-0-2", &KeyChord::plain(Key::Backspace));
        grid.on_type("cellinput-0-2", "not-a-number");
        grid.on_key("cellinput-0-2", &KeyChord::plain(Key::Enter));
        assert!(grid.warnings.contains_key(&(0, 2)));
    }

    #[test]
    fn test_paste_grows_rows() {
        let mut grid = sample();
        grid.apply_paste(2, 1, "X\t1\nY\t2\nZ\t3");
        assert_eq!(grid.row_count(), 5);
        assert_eq!(grid.cell_text(4, 1), Some("Z"));
        assert_eq!(grid.cell_text(4, 2), Some("3"));
    }

    #[test]
    fn test_paste_ignores_trailing_newline() {
        let mut grid = sample();
        grid.apply_paste(0, 1, "A\tB\n");
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.cell_text(0, 1), Some("A"));
    }

    #[test]
    fn test_select_all_toggle() {
        let mut grid = sample();
        grid.on_click("selectall");
        assert!(grid.row_checked.iter().all(|&b| b));
        grid.on_click("selectall");
        assert!(grid.row_checked.iter().all(|&b| !b));
    }

    #[test]
    fn test_shift_arrow_extends_selection() {
        let mut grid = sample();
        grid.on_click("cell-0-1");
        grid.on_key("cell-0-1", &KeyChord::shift(Key::ArrowDown));
        grid.on_key("cell-0-1", &KeyChord::shift(Key::ArrowRight));
        assert_eq!(grid.in_selection.len(), 4);
        // A new click exits the multi-selection.
        grid.on_click("cell-2-2");
        assert!(grid.in_selection.is_empty());
    }

    #[test]
    fn test_read_only_row_rejects_edit() {
        let mut grid = sample();
        grid.set_row_read_only(1);
        grid.on_click("cell-1-1");
        assert!(!grid.editing);
        grid.apply_paste(1, 1, "nope");
        assert_eq!(grid.cell_text(1, 1), Some("Grace"));
    }

    #[test]
    fn test_render_reflects_state_classes() {
        let mut grid = sample();
        grid.on_click("cell-1-1");
        let mut dom = MockDom::new();
        grid.render(&mut dom);
        assert_eq!(dom.select("td.cell-selected"), vec!["cell-1-1"]);
        assert_eq!(dom.select("input.cell-editor").len(), 1);
    }

    fn date_sample() -> FakeGrid {
        FakeGrid::new(
            vec![
                FakeColumn::new("Sample", FakeColumnKind::Text),
                FakeColumn::new("Collected", FakeColumnKind::Date),
            ],
            vec![vec!["S-1".into(), String::new()]],
        )
    }

    #[test]
    fn test_date_column_renders_picker_editor() {
        let mut grid = date_sample();
        grid.on_click("cell-0-1");
        let mut dom = MockDom::new();
        grid.render(&mut dom);
        assert_eq!(dom.select("input.date-editor"), vec!["dateinput-0-1"]);
        assert!(dom.select("input.cell-editor").is_empty());
    }

    #[test]
    fn test_date_validation_on_commit() {
        let mut grid = date_sample();
        grid.on_click("cell-0-1");
        grid.on_key("dateinput-0-1", &KeyChord::plain(Key::Backspace));
        grid.on_type("dateinput-0-1", "tomorrow");
        grid.on_key("dateinput-0-1", &KeyChord::plain(Key::Enter));
        assert!(grid.warnings.contains_key(&(0, 1)));

        grid.on_click("cell-0-1");
        grid.on_key("dateinput-0-1", &KeyChord::plain(Key::Backspace));
        grid.on_type("dateinput-0-1", "2024-03-07");
        grid.on_key("dateinput-0-1", &KeyChord::plain(Key::Enter));
        assert!(grid.warnings.is_empty());
        assert_eq!(grid.cell_text(0, 1), Some("2024-03-07"));
    }

    #[test]
    fn test_lookup_options_filtered_by_pending() {
        let mut grid = FakeGrid::new(
            vec![FakeColumn::new(
                "Units",
                FakeColumnKind::Lookup(vec!["mg".into(), "mL".into(), "units".into()]),
            )],
            vec![vec![String::new()]],
        );
        grid.on_click("cell-0-0");
        grid.on_key("cellinput-0-0", &KeyChord::plain(Key::Backspace));
        grid.on_type("cellinput-0-0", "m");
        assert_eq!(grid.visible_options(), vec!["mg".to_string(), "mL".to_string()]);
        grid.on_click("opt-1");
        assert_eq!(grid.cell_text(0, 0), Some("mL"));
    }
}
