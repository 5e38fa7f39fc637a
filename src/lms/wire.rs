//! Wire types - JSON shapes returned by the LMS REST API.
//! Only the fields the exporter needs are decoded, the rest is ignored.

use crate::entities::{Group, GroupCategory, MISSING_EMAIL, Student};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct LmsUser {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<LmsUser> for Student {
    fn from(value: LmsUser) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email.unwrap_or_else(|| MISSING_EMAIL.to_string()),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct LmsGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub group_category_id: Option<i64>,
}

impl From<LmsGroup> for Group {
    fn from(value: LmsGroup) -> Self {
        Self {
            id: value.id,
            name: value.name,
            group_category_id: value.group_category_id,
        }
    }
}

/// Membership listings can include staff or pending invitations, every entry is kept
#[derive(Deserialize, Debug)]
pub struct LmsMembership {
    pub user_id: i64,
}

#[derive(Deserialize, Debug)]
pub struct LmsGroupCategory {
    pub id: i64,
    pub name: String,
}

impl From<LmsGroupCategory> for GroupCategory {
    fn from(value: LmsGroupCategory) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}
