//! Workflow page objects for the data-management application under
//! test.
//!
//! Each page object composes a [`bancada::Page`] with the component
//! wrappers the screen actually contains. Scenario tests live in
//! `tests/` and drive these page objects against the mock driver.

#![warn(missing_docs)]

mod designer;
mod etl;
mod security;
mod time_chart;

pub use designer::SampleTypeDesignerPage;
pub use etl::{job_id_of, EtlJobPage, TransformStatus};
pub use security::StudySecurityPage;
pub use time_chart::{Axis, TimeChartPage};
