//! Cell state classification for editable grids.
//!
//! The application paints cell state as CSS classes. All class-name
//! knowledge lives in [`CellClassNames`] so a styling change in the
//! application touches exactly one table here; everything else works
//! with the [`CellState`] enum.

use serde::{Deserialize, Serialize};

/// Interaction state of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Not selected and editable
    Idle,
    /// The active (anchor) cell of the current selection
    Selected,
    /// Inside a multi-cell selection rectangle, not the anchor
    InSelection,
    /// Not editable
    ReadOnly,
}

impl CellState {
    /// Human-readable name, used in assertion messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selected => "selected",
            Self::InSelection => "in-selection",
            Self::ReadOnly => "read-only",
        }
    }

    /// Whether a cell in this state accepts edits
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }

    /// Whether a cell in this state is part of the current selection
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        matches!(self, Self::Selected | Self::InSelection)
    }

    /// Classify from a class list using the default vocabulary
    #[must_use]
    pub fn from_classes<S: AsRef<str>>(classes: &[S]) -> Self {
        CellClassNames::default().classify(classes)
    }
}

impl std::fmt::Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The CSS class vocabulary one grid implementation uses for cell state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellClassNames {
    /// Class on the anchor cell of the selection
    pub selected: String,
    /// Class on non-anchor cells of a selection rectangle
    pub in_selection: String,
    /// Class on cells that reject edits
    pub read_only: String,
    /// Class on cells carrying a validation warning
    pub warning: String,
}

impl Default for CellClassNames {
    fn default() -> Self {
        Self {
            selected: "cell-selected".to_string(),
            in_selection: "cell-selection".to_string(),
            read_only: "cell-read-only".to_string(),
            warning: "cell-warning".to_string(),
        }
    }
}

impl CellClassNames {
    /// Classify a cell from its class list.
    ///
    /// Read-only wins over selection state: a read-only cell inside a
    /// selection rectangle still rejects edits.
    #[must_use]
    pub fn classify<S: AsRef<str>>(&self, classes: &[S]) -> CellState {
        let has = |name: &str| classes.iter().any(|c| c.as_ref() == name);
        if has(&self.read_only) {
            CellState::ReadOnly
        } else if has(&self.selected) {
            CellState::Selected
        } else if has(&self.in_selection) {
            CellState::InSelection
        } else {
            CellState::Idle
        }
    }

    /// Whether the class list carries a validation warning.
    ///
    /// Warnings are orthogonal to interaction state; a selected cell
    /// can warn at the same time.
    #[must_use]
    pub fn has_warning<S: AsRef<str>>(&self, classes: &[S]) -> bool {
        classes.iter().any(|c| c.as_ref() == self.warning)
    }
}
