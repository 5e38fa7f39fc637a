//! Entities module - domain types shared by the fetcher, the joiner and the exporter

pub mod group;
pub mod roster;
pub mod student;

pub use group::{Group, GroupCategory, Membership};
pub use roster::{CourseData, EnrichedStudent, GroupSummary, Roster};
pub use student::{MISSING_EMAIL, Student};
