//! Bancada: page-object and editable-grid testing library
//!
//! Bancada (Spanish: "workbench") drives browser-based end-to-end tests
//! for data-management applications built around editable grids: pages
//! declare their elements lazily, grids are addressed by (row, column
//! caption), and every interaction that depends on application state is
//! a single bounded wait that either converges or fails with an error
//! naming the awaited condition.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ workflow page objects (composition over Page)              │
//! ├──────────────┬─────────────────┬─────────────┬─────────────┤
//! │ EditableGrid │ DetailTableEdit │ ModalDialog │ ComboBox    │
//! ├────────────────────────────────────────────────────────────┤
//! │ Page / ElementCache / LazyElement / Locator / waits        │
//! ├────────────────────────────────────────────────────────────┤
//! │ PageDriver (async seam)  ── MockDriver + fake DOM          │
//! └────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod cell;

/// Session configuration and log initialization
pub mod config;

mod detail;
mod dialog;
mod driver;
mod element;
mod event;
mod grid;
mod locator;

/// Local SMTP capture for notification workflows
pub mod mailtrap;

/// Mock driver runtime for browser-free tests
pub mod mock;

mod page;

/// Remote command API client (feature `remote`)
#[cfg(feature = "remote")]
pub mod remote;

mod result;
mod select;
mod wait;

pub use cell::{CellClassNames, CellState};
pub use config::{init_tracing, SessionConfig};
pub use detail::{DetailTableEdit, FieldKind};
pub use dialog::ModalDialog;
pub use driver::{DriverConfig, ElementHandle, PageDriver};
pub use element::{resolve_all, resolve_one, ElementCache, LazyElement};
pub use event::{Key, KeyChord, Modifier};
pub use grid::{
    parse_paste_block, CellValue, EditableGrid, ValueMatch, SELECT_COLUMN_NAME,
};
pub use locator::{Locator, LocatorOptions, Selector};
pub use page::{open, Page, PageObject, UrlMatcher};
pub use result::{BancadaError, BancadaResult};
pub use select::ComboBox;
pub use wait::{
    poll_until, poll_until_ok, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS, SHORT_WAIT_TIMEOUT_MS,
};
