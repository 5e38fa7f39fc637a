//! Export DTOs - the JSON body posted to `POST /export`
//!
//! The browser script reads ids and counts back from table cells, so numbers
//! are accepted both as JSON numbers and as numeric strings.

use crate::entities::{EnrichedStudent, GroupCategory, GroupSummary, MISSING_EMAIL, Roster};
use crate::export::NO_GROUP;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Deserialize, Debug)]
pub struct ExportRequest {
    pub students: Vec<ExportStudent>,
    pub groups: Vec<ExportGroup>,
    #[serde(default)]
    pub group_categories: Option<Vec<ExportCategory>>,
}

#[derive(Deserialize, Debug)]
pub struct ExportStudent {
    #[serde(deserialize_with = "number_or_string")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct ExportGroup {
    #[serde(deserialize_with = "number_or_string")]
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub members_count: usize,
}

#[derive(Deserialize, Debug)]
pub struct ExportCategory {
    #[serde(deserialize_with = "number_or_string")]
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Text(String),
}

fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + TryFrom<i64>,
{
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Int(value) => T::try_from(value)
            .map_err(|_| D::Error::custom(format!("number out of range: {}", value))),
        RawNumber::Text(text) => text
            .trim()
            .parse::<T>()
            .map_err(|_| D::Error::custom(format!("expected a number, got {:?}", text))),
    }
}

/// A lone "No Group" cell stands for an empty list; a real group with that
/// name next to others is kept.
fn without_placeholder(groups: Vec<String>) -> Vec<String> {
    match groups.as_slice() {
        [only] if only == NO_GROUP => Vec::new(),
        _ => groups,
    }
}

impl From<ExportStudent> for EnrichedStudent {
    fn from(value: ExportStudent) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email.unwrap_or_else(|| MISSING_EMAIL.to_string()),
            groups: without_placeholder(value.groups),
        }
    }
}

impl From<ExportRequest> for Roster {
    fn from(value: ExportRequest) -> Self {
        Self {
            students: value.students.into_iter().map(EnrichedStudent::from).collect(),
            groups: value
                .groups
                .into_iter()
                .map(|g| GroupSummary {
                    id: g.id,
                    name: g.name,
                    members_count: g.members_count,
                })
                .collect(),
            group_categories: value.group_categories.map(|categories| {
                categories
                    .into_iter()
                    .map(|c| GroupCategory { id: c.id, name: c.name })
                    .collect()
            }),
        }
    }
}
