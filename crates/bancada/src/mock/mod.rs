//! Mock driver runtime.
//!
//! Unit and workflow tests run against a fake DOM instead of a live
//! browser: [`MockDriver`] implements [`crate::driver::PageDriver`]
//! over [`MockDom`], and [`FakeGrid`] is an application model that
//! re-renders that DOM after every gesture. Test the code, not a
//! hand-rolled model of the code: the page objects and grid wrapper
//! under test issue the exact same driver calls they would against a
//! real backend.

mod dom;
mod driver;
mod grid;

pub use dom::{MockDom, MockNode};
pub use driver::{FakeApp, MockDriver};
pub use grid::{FakeColumn, FakeColumnKind, FakeGrid};
