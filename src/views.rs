//! HTML views - Tera templates compiled into the binary

use crate::entities::Roster;
use crate::export::groups_cell;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::{Context, Tera};

const BASE_TEMPLATE: &str = include_str!("../templates/base.html");
const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const RESULTS_TEMPLATE: &str = include_str!("../templates/results.html");

/// Browser script served at `/static/script.js`
pub const SCRIPT_JS: &str = include_str!("../static/script.js");

#[derive(Serialize)]
struct StudentRow<'a> {
    id: i64,
    name: &'a str,
    email: &'a str,
    groups: String,
}

pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", BASE_TEMPLATE),
            ("index.html", INDEX_TEMPLATE),
            ("results.html", RESULTS_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    pub fn render_index(&self) -> Result<String, tera::Error> {
        self.tera.render("index.html", &Context::new())
    }

    /// Renders the tables plus the roster JSON the export button posts back
    pub fn render_results(
        &self,
        course_id: &str,
        roster: &Roster,
        extracted_at: DateTime<Utc>,
    ) -> Result<String, tera::Error> {
        let students: Vec<StudentRow> = roster
            .students
            .iter()
            .map(|s| StudentRow {
                id: s.id,
                name: &s.name,
                email: &s.email,
                groups: groups_cell(&s.groups),
            })
            .collect();
        let roster_json = serde_json::to_string(roster)
            .map_err(|e| tera::Error::msg(format!("cannot serialize roster: {}", e)))?;

        let mut context = Context::new();
        context.insert("course_id", course_id);
        context.insert("extracted_at", &extracted_at.format("%Y-%m-%d %H:%M UTC").to_string());
        context.insert("students", &students);
        context.insert("groups", &roster.groups);
        context.insert("group_categories", &roster.group_categories);
        context.insert("roster_json", &roster_json);

        self.tera.render("results.html", &context)
    }
}
