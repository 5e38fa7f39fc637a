//! Extract DTOs - the form submitted from the landing page

use crate::core::ExtractError;
use crate::lms::split_course_url;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Form fields of `POST /extract`.
/// Missing fields deserialize as empty so they surface as InvalidInput, not as a 422.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct ExtractForm {
    #[serde(default)]
    #[validate(length(max = 1024, message = "api_key is too long"))]
    pub api_key: String,
    #[serde(default)]
    #[validate(length(max = 2048, message = "base_url is too long"))]
    pub base_url: String,
    #[serde(default)]
    #[validate(length(max = 64, message = "course_id is too long"))]
    pub course_id: String,
    /// Full course page URL, used when base_url / course_id are left empty
    #[serde(default)]
    #[validate(length(max = 2048, message = "course_url is too long"))]
    pub course_url: Option<String>,
}

/// The three inputs of a fetch once the form has been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseTarget {
    pub api_key: String,
    pub base_url: String,
    pub course_id: String,
}

impl ExtractForm {
    /// Fills base_url and course_id from course_url when they are blank.
    /// Emptiness of the final values is checked by the LMS client.
    pub fn resolve(self) -> Result<CourseTarget, ExtractError> {
        let course_url = self
            .course_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());

        let (base_url, course_id) = match course_url {
            Some(url) if self.base_url.trim().is_empty() || self.course_id.trim().is_empty() => {
                let (derived_base, derived_course) = split_course_url(url)?;
                let base_url = if self.base_url.trim().is_empty() {
                    derived_base
                } else {
                    self.base_url
                };
                let course_id = if self.course_id.trim().is_empty() {
                    derived_course
                } else {
                    self.course_id
                };
                (base_url, course_id)
            }
            _ => (self.base_url, self.course_id),
        };

        Ok(CourseTarget {
            api_key: self.api_key,
            base_url,
            course_id,
        })
    }
}
