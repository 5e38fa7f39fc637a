//! DTOs module - Data Transfer Objects
//!
//! Shapes exchanged with the browser, kept apart from the domain entities.

pub mod export;
pub mod extract;

pub use export::{ExportCategory, ExportGroup, ExportRequest, ExportStudent};
pub use extract::{CourseTarget, ExtractForm};
