//! Roster entities - the fetched course data and the joined result.
//! Everything here lives for a single request.

use super::{Group, GroupCategory, Student};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw data returned by the LMS for one course
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseData {
    pub students: Vec<Student>,
    /// In the order the LMS returned them
    pub groups: Vec<Group>,
    /// group id -> user ids, one entry per membership record
    pub memberships_by_group: HashMap<i64, Vec<i64>>,
    pub group_categories: Option<Vec<GroupCategory>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnrichedStudent {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Names of the groups the student belongs to, in group fetch order
    pub groups: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub id: i64,
    pub name: String,
    pub members_count: usize,
}

/// Output of the join, input of the export
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub students: Vec<EnrichedStudent>,
    pub groups: Vec<GroupSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_categories: Option<Vec<GroupCategory>>,
}
