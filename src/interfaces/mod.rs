//! Adapters between the workflow and the outside world: terminal output and
//! CSV export.

pub mod csv;
pub mod presenter;
