//! Student entity - a user enrolled as student in the course

use serde::{Deserialize, Serialize};

/// Placeholder used when the LMS does not expose a student's email
pub const MISSING_EMAIL: &str = "N/A";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
}
