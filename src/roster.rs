//! Roster join - attaches group names to students and counts group members

use crate::entities::{CourseData, EnrichedStudent, GroupSummary, Roster};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Joins students to groups by user id.
///
/// A student's `groups` follow the order in which groups were fetched.
/// `members_count` is the number of membership entries of the group, whether
/// or not those users are enrolled students.
pub fn join(data: &CourseData) -> Roster {
    let groups: Vec<GroupSummary> = data
        .groups
        .iter()
        .map(|group| GroupSummary {
            id: group.id,
            name: group.name.clone(),
            members_count: data
                .memberships_by_group
                .get(&group.id)
                .map_or(0, Vec::len),
        })
        .collect();

    // user id -> group names, filled in group order
    let mut names_by_user: HashMap<i64, Vec<&str>> = HashMap::new();
    for group in &data.groups {
        let Some(members) = data.memberships_by_group.get(&group.id) else {
            continue;
        };
        let mut seen = HashSet::with_capacity(members.len());
        for user_id in members {
            if seen.insert(*user_id) {
                names_by_user
                    .entry(*user_id)
                    .or_default()
                    .push(group.name.as_str());
            }
        }
    }

    let students: Vec<EnrichedStudent> = data
        .students
        .iter()
        .map(|student| EnrichedStudent {
            id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            groups: names_by_user
                .get(&student.id)
                .map(|names| names.iter().map(|name| name.to_string()).collect())
                .unwrap_or_default(),
        })
        .collect();

    debug!(
        "Joined {} students with {} groups",
        students.len(),
        groups.len()
    );

    Roster {
        students,
        groups,
        group_categories: data.group_categories.clone(),
    }
}
