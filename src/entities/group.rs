//! Group entities - course groups, their memberships and categories

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_category_id: Option<i64>,
}

/// One entry of a group's membership listing
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub group_id: i64,
    pub user_id: i64,
}

/// Set of groups (e.g. "Project Teams"); only fetched when enabled
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupCategory {
    pub id: i64,
    pub name: String,
}
