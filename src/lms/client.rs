//! LmsClient - issues the roster calls against the LMS REST API

use super::wire::{LmsGroup, LmsGroupCategory, LmsMembership, LmsUser};
use crate::core::{Config, ExtractError};
use crate::entities::{CourseData, Group, GroupCategory, Membership, Student};
use futures::{StreamExt, TryStreamExt, stream};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Validated inputs of a single fetch
#[derive(Debug, Clone)]
pub struct CourseRequest {
    api_key: String,
    base_url: Url,
    course_id: String,
}

impl CourseRequest {
    /// Checks the three inputs before anything touches the network
    pub fn new(api_key: &str, base_url: &str, course_id: &str) -> Result<Self, ExtractError> {
        let api_key = api_key.trim();
        let base_url = base_url.trim();
        let course_id = course_id.trim();

        if api_key.is_empty() {
            return Err(ExtractError::invalid_input("api_key is required"));
        }
        if base_url.is_empty() {
            return Err(ExtractError::invalid_input("base_url is required"));
        }
        if course_id.is_empty() {
            return Err(ExtractError::invalid_input("course_id is required"));
        }

        let parsed = Url::parse(base_url)
            .map_err(|_| ExtractError::invalid_input("base_url is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ExtractError::invalid_input(
                "base_url must be an http(s) URL",
            ));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: parsed,
            course_id: course_id.to_string(),
        })
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    /// Appends `segments` to the base URL, keeping any path prefix it already has
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn students_url(&self) -> Url {
        let mut url = self.endpoint(&["api", "v1", "courses", &self.course_id, "users"]);
        url.query_pairs_mut()
            .append_pair("enrollment_type[]", "student");
        url
    }

    fn groups_url(&self) -> Url {
        self.endpoint(&["api", "v1", "courses", &self.course_id, "groups"])
    }

    fn group_categories_url(&self) -> Url {
        self.endpoint(&["api", "v1", "courses", &self.course_id, "group_categories"])
    }

    fn memberships_url(&self, group_id: i64) -> Url {
        let group_id = group_id.to_string();
        self.endpoint(&["api", "v1", "groups", &group_id, "memberships"])
    }
}

pub struct LmsClient {
    http: reqwest::Client,
    timeout: Duration,
    concurrency: usize,
    include_group_categories: bool,
}

impl LmsClient {
    /// Builds the HTTP client once; the timeout applies to every single call
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = config.lms_timeout();
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            timeout,
            concurrency: config.membership_fetch_concurrency.max(1),
            include_group_categories: config.include_group_categories,
        })
    }

    /// Fetches students, groups and every group's memberships for a course.
    ///
    /// Membership calls run with at most `concurrency` requests in flight and
    /// keep the group order. The first failing call aborts the whole fetch.
    #[instrument(skip(self, api_key), fields(course_id = %course_id))]
    pub async fn fetch_course(
        &self,
        api_key: &str,
        base_url: &str,
        course_id: &str,
    ) -> Result<CourseData, ExtractError> {
        let request = CourseRequest::new(api_key, base_url, course_id)?;
        self.fetch(&request).await
    }

    pub async fn fetch(&self, request: &CourseRequest) -> Result<CourseData, ExtractError> {
        debug!("Fetching students");
        let students: Vec<Student> = self
            .get_json::<Vec<LmsUser>>(request, request.students_url())
            .await?
            .into_iter()
            .map(Student::from)
            .collect();

        debug!("Fetching groups");
        let groups: Vec<Group> = self
            .get_json::<Vec<LmsGroup>>(request, request.groups_url())
            .await?
            .into_iter()
            .map(Group::from)
            .collect();

        let group_categories = if self.include_group_categories {
            debug!("Fetching group categories");
            let categories: Vec<GroupCategory> = self
                .get_json::<Vec<LmsGroupCategory>>(request, request.group_categories_url())
                .await?
                .into_iter()
                .map(GroupCategory::from)
                .collect();
            Some(categories)
        } else {
            None
        };

        debug!(
            "Fetching memberships for {} groups ({} at a time)",
            groups.len(),
            self.concurrency
        );
        let group_ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
        let memberships: Vec<Vec<Membership>> = stream::iter(group_ids)
            .map(|group_id| self.fetch_memberships(request, group_id))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut memberships_by_group: HashMap<i64, Vec<i64>> = groups
            .iter()
            .map(|group| (group.id, Vec::new()))
            .collect();
        for membership in memberships.into_iter().flatten() {
            memberships_by_group
                .entry(membership.group_id)
                .or_default()
                .push(membership.user_id);
        }

        info!(
            "Fetched {} students and {} groups for course {}",
            students.len(),
            groups.len(),
            request.course_id()
        );

        Ok(CourseData {
            students,
            groups,
            memberships_by_group,
            group_categories,
        })
    }

    async fn fetch_memberships(
        &self,
        request: &CourseRequest,
        group_id: i64,
    ) -> Result<Vec<Membership>, ExtractError> {
        let entries = self
            .get_json::<Vec<LmsMembership>>(request, request.memberships_url(group_id))
            .await?;
        debug!("Group {} has {} memberships", group_id, entries.len());

        Ok(entries
            .into_iter()
            .map(|entry| Membership {
                group_id,
                user_id: entry.user_id,
            })
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: &CourseRequest,
        url: Url,
    ) -> Result<T, ExtractError> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&request.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            warn!("LMS returned {} for {}", status, url.path());
            return Err(status_error(status, &url));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ExtractError::Timeout(self.timeout)
            } else {
                warn!("Undecodable LMS response from {}: {}", url.path(), e);
                ExtractError::Fetch(format!("invalid response from {}: {}", url.path(), e))
            }
        })
    }

    fn transport_error(&self, err: reqwest::Error, url: &Url) -> ExtractError {
        if err.is_timeout() {
            warn!("Timeout calling {} (exceeded {:?})", url.path(), self.timeout);
            ExtractError::Timeout(self.timeout)
        } else if err.is_connect() {
            warn!("Connection failed for {}: {}", url.path(), err);
            ExtractError::Connectivity(err.to_string())
        } else {
            warn!("Request to {} failed: {}", url.path(), err);
            ExtractError::Fetch(err.to_string())
        }
    }
}

/// Maps a non-success HTTP status to the matching pipeline error
pub fn status_error(status: StatusCode, url: &Url) -> ExtractError {
    match status {
        StatusCode::UNAUTHORIZED => ExtractError::Unauthorized,
        StatusCode::FORBIDDEN => ExtractError::PermissionDenied,
        StatusCode::NOT_FOUND => ExtractError::NotFound,
        s if s.is_server_error() => ExtractError::UpstreamUnavailable { status: s.as_u16() },
        s => ExtractError::Fetch(format!("unexpected status {} from {}", s, url.path())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(base: &str) -> CourseRequest {
        CourseRequest::new("token", base, "42").unwrap()
    }

    #[test]
    fn test_missing_fields_are_invalid_input() {
        for (key, base, course) in [
            ("", "https://lms.example.edu", "42"),
            ("token", "  ", "42"),
            ("token", "https://lms.example.edu", ""),
        ] {
            let err = CourseRequest::new(key, base, course).unwrap_err();
            assert!(matches!(err, ExtractError::InvalidInput(_)), "{err:?}");
        }
    }

    #[test]
    fn test_malformed_base_url_is_invalid_input() {
        assert!(matches!(
            CourseRequest::new("token", "lms.example.edu", "42"),
            Err(ExtractError::InvalidInput(_))
        ));
        assert!(matches!(
            CourseRequest::new("token", "ftp://lms.example.edu", "42"),
            Err(ExtractError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_endpoints_are_joined_onto_base_url() {
        let req = request("https://lms.example.edu/");
        assert_eq!(
            req.groups_url().as_str(),
            "https://lms.example.edu/api/v1/courses/42/groups"
        );
        assert_eq!(
            req.memberships_url(7).as_str(),
            "https://lms.example.edu/api/v1/groups/7/memberships"
        );

        let students = req.students_url();
        assert_eq!(students.path(), "/api/v1/courses/42/users");
        let pairs: Vec<(String, String)> = students.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("enrollment_type[]".to_string(), "student".to_string())]
        );
    }

    #[test]
    fn test_base_url_path_prefix_is_kept() {
        let req = request("https://school.example.edu/canvas");
        assert_eq!(
            req.groups_url().as_str(),
            "https://school.example.edu/canvas/api/v1/courses/42/groups"
        );
    }

    #[test]
    fn test_status_mapping() {
        let url = Url::parse("https://lms.example.edu/api/v1/courses/1/users").unwrap();
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, &url),
            ExtractError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, &url),
            ExtractError::PermissionDenied
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, &url),
            ExtractError::NotFound
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, &url),
            ExtractError::UpstreamUnavailable { status: 502 }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, &url),
            ExtractError::Fetch(_)
        ));
    }
}
