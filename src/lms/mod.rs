//! LMS module - HTTP access to the course roster API
//!
//! Three kinds of GET call are issued per course: students, groups, and the
//! memberships of every group (plus group categories when enabled).

pub mod client;
pub mod wire;

pub use client::{CourseRequest, LmsClient, status_error};

use crate::core::ExtractError;
use url::Url;

/// Splits a course page URL such as `https://school.example.edu/courses/42`
/// into the API base URL and the course id.
pub fn split_course_url(course_url: &str) -> Result<(String, String), ExtractError> {
    let url = Url::parse(course_url.trim()).map_err(|_| {
        ExtractError::invalid_input(
            "Invalid course URL. Please provide a valid course URL.",
        )
    })?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let course_id = segments
        .iter()
        .position(|segment| *segment == "courses")
        .and_then(|idx| segments.get(idx + 1))
        .or_else(|| segments.last())
        .map(|id| id.to_string())
        .ok_or_else(|| ExtractError::invalid_input("The course URL does not contain a course id"))?;

    let base_url = url.origin().ascii_serialization();
    if base_url == "null" {
        return Err(ExtractError::invalid_input(
            "Invalid course URL. Please provide a valid course URL.",
        ));
    }

    Ok((base_url, course_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_course_url() {
        let (base, id) = split_course_url("https://school.instructure.com/courses/1234").unwrap();
        assert_eq!(base, "https://school.instructure.com");
        assert_eq!(id, "1234");
    }

    #[test]
    fn test_split_course_url_with_sub_page_and_port() {
        let (base, id) =
            split_course_url("http://localhost:8080/courses/77/groups#tab-1").unwrap();
        assert_eq!(base, "http://localhost:8080");
        assert_eq!(id, "77");
    }

    #[test]
    fn test_split_course_url_rejects_garbage() {
        assert!(matches!(
            split_course_url("not a url"),
            Err(ExtractError::InvalidInput(_))
        ));
        assert!(matches!(
            split_course_url("https://school.instructure.com/"),
            Err(ExtractError::InvalidInput(_))
        ));
    }
}
