//! CSV export - renders a roster as CSV and hands it out as a one-shot temp file

use crate::core::ExtractError;
use crate::entities::Roster;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// Cell value for students without any group
pub const NO_GROUP: &str = "No Group";

/// Name proposed to the browser for the download
pub const DOWNLOAD_FILE_NAME: &str = "canvas_course_data.csv";

const STUDENT_HEADER: [&str; 4] = ["id", "name", "email", "groups"];
const GROUP_HEADER: [&str; 3] = ["id", "name", "members_count"];
const CATEGORY_HEADER: [&str; 2] = ["id", "name"];

/// Renders the `groups` column of a student row
pub fn groups_cell(groups: &[String]) -> String {
    if groups.is_empty() {
        NO_GROUP.to_string()
    } else {
        groups.join(", ")
    }
}

/// Writes the students table, a blank line, the groups table and, when present,
/// another blank line followed by the group categories table.
pub fn render_csv<W: Write>(roster: &Roster, writer: W) -> Result<W, ExtractError> {
    let students = roster.students.iter().map(|s| {
        vec![
            s.id.to_string(),
            s.name.clone(),
            s.email.clone(),
            groups_cell(&s.groups),
        ]
    });
    let mut writer = write_table(writer, &STUDENT_HEADER, students)?;

    writer.write_all(b"\n").map_err(export_error)?;
    let groups = roster
        .groups
        .iter()
        .map(|g| vec![g.id.to_string(), g.name.clone(), g.members_count.to_string()]);
    let mut writer = write_table(writer, &GROUP_HEADER, groups)?;

    if let Some(categories) = &roster.group_categories {
        writer.write_all(b"\n").map_err(export_error)?;
        let rows = categories
            .iter()
            .map(|c| vec![c.id.to_string(), c.name.clone()]);
        writer = write_table(writer, &CATEGORY_HEADER, rows)?;
    }

    Ok(writer)
}

fn write_table<W, I>(writer: W, header: &[&str], rows: I) -> Result<W, ExtractError>
where
    W: Write,
    I: Iterator<Item = Vec<String>>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(header).map_err(export_error)?;
    for row in rows {
        csv_writer.write_record(&row).map_err(export_error)?;
    }
    csv_writer
        .into_inner()
        .map_err(|e| ExtractError::Export(e.error().to_string()))
}

fn export_error<E: std::fmt::Display>(err: E) -> ExtractError {
    ExtractError::Export(err.to_string())
}

/// A written CSV file with a single owner. The file is removed when the
/// artifact is consumed or dropped.
#[derive(Debug)]
pub struct ExportArtifact {
    file: NamedTempFile,
}

impl ExportArtifact {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Reads the file for the download response and deletes it
    pub async fn into_bytes(self) -> Result<Vec<u8>, ExtractError> {
        let bytes = tokio::fs::read(self.file.path())
            .await
            .map_err(export_error)?;
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!("Failed to delete export file {}: {}", path.display(), e);
        } else {
            debug!("Deleted export file {}", path.display());
        }
        Ok(bytes)
    }
}

pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    /// Artifacts go to `dir`, or to the system temp directory
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
        }
    }

    /// Writes the roster to a uniquely named file.
    /// On failure the partially written file is removed before returning.
    #[instrument(skip(self, roster), fields(students = roster.students.len(), groups = roster.groups.len()))]
    pub fn export(&self, roster: &Roster) -> Result<ExportArtifact, ExtractError> {
        self.export_with(roster, |roster, out| render_csv(roster, out).map(|_| ()))
    }

    fn export_with<F>(&self, roster: &Roster, render: F) -> Result<ExportArtifact, ExtractError>
    where
        F: FnOnce(&Roster, &mut dyn Write) -> Result<(), ExtractError>,
    {
        let mut file = tempfile::Builder::new()
            .prefix("roster_")
            .suffix(".csv")
            .tempfile_in(&self.dir)
            .map_err(export_error)?;

        let written = {
            let mut writer = BufWriter::new(file.as_file_mut());
            render(roster, &mut writer).and_then(|()| writer.flush().map_err(export_error))
        };
        if let Err(e) = written {
            let path = file.path().to_path_buf();
            if let Err(close_err) = file.close() {
                warn!("Failed to delete partial export {}: {}", path.display(), close_err);
            }
            return Err(e);
        }

        info!("Export written to {}", file.path().display());
        Ok(ExportArtifact { file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EnrichedStudent, GroupCategory, GroupSummary};
    use std::io;

    fn roster() -> Roster {
        Roster {
            students: vec![
                EnrichedStudent {
                    id: 1,
                    name: "Ada Lovelace".to_string(),
                    email: "ada@x.com".to_string(),
                    groups: vec!["G1".to_string(), "G2".to_string()],
                },
                EnrichedStudent {
                    id: 2,
                    name: "Doe, Jane".to_string(),
                    email: "N/A".to_string(),
                    groups: vec![],
                },
            ],
            groups: vec![
                GroupSummary {
                    id: 10,
                    name: "G1".to_string(),
                    members_count: 1,
                },
                GroupSummary {
                    id: 11,
                    name: "G2".to_string(),
                    members_count: 3,
                },
            ],
            group_categories: None,
        }
    }

    fn render(roster: &Roster) -> String {
        String::from_utf8(render_csv(roster, Vec::new()).unwrap()).unwrap()
    }

    fn parse_section(section: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(section.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_groups_cell() {
        assert_eq!(groups_cell(&[]), "No Group");
        assert_eq!(
            groups_cell(&["B".to_string(), "A".to_string()]),
            "B, A"
        );
    }

    #[test]
    fn test_render_layout() {
        let csv = render(&roster());
        assert_eq!(
            csv,
            "id,name,email,groups\n\
             1,Ada Lovelace,ada@x.com,\"G1, G2\"\n\
             2,\"Doe, Jane\",N/A,No Group\n\
             \n\
             id,name,members_count\n\
             10,G1,1\n\
             11,G2,3\n"
        );
    }

    #[test]
    fn test_round_trip_through_blank_line() {
        let roster = roster();
        let csv = render(&roster);
        let sections: Vec<&str> = csv.split("\n\n").collect();
        assert_eq!(sections.len(), 2);

        let students = parse_section(sections[0]);
        assert_eq!(students[0], vec!["id", "name", "email", "groups"]);
        assert_eq!(students.len(), roster.students.len() + 1);
        for (row, student) in students[1..].iter().zip(&roster.students) {
            assert_eq!(row[0], student.id.to_string());
            assert_eq!(row[1], student.name);
            assert_eq!(row[2], student.email);
            assert_eq!(row[3], groups_cell(&student.groups));
        }

        let groups = parse_section(sections[1]);
        assert_eq!(groups[0], vec!["id", "name", "members_count"]);
        assert_eq!(groups.len(), roster.groups.len() + 1);
        for (row, group) in groups[1..].iter().zip(&roster.groups) {
            assert_eq!(row[0], group.id.to_string());
            assert_eq!(row[1], group.name);
            assert_eq!(row[2], group.members_count.to_string());
        }
    }

    #[test]
    fn test_categories_table_is_appended() {
        let mut roster = roster();
        roster.group_categories = Some(vec![GroupCategory {
            id: 5,
            name: "Project Teams".to_string(),
        }]);
        let csv = render(&roster);
        let sections: Vec<&str> = csv.split("\n\n").collect();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[2], "id,name\n5,Project Teams\n");
    }

    #[test]
    fn test_empty_roster_still_has_headers() {
        let csv = render(&Roster::default());
        assert_eq!(csv, "id,name,email,groups\n\nid,name,members_count\n");
    }

    #[derive(Debug)]
    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    #[test]
    fn test_write_failure_is_export_error() {
        let err = render_csv(&roster(), BrokenWriter).unwrap_err();
        assert!(matches!(err, ExtractError::Export(_)));
    }

    #[tokio::test]
    async fn test_artifact_is_deleted_after_download() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(Some(dir.path().to_path_buf()));

        let artifact = exporter.export(&roster()).unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("roster_") && name.ends_with(".csv"));

        let bytes = artifact.into_bytes().await.unwrap();
        assert!(String::from_utf8(bytes).unwrap().starts_with("id,name,email,groups\n"));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_dropped_artifact_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(Some(dir.path().to_path_buf()));

        let path = {
            let artifact = exporter.export(&roster()).unwrap();
            artifact.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_render_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(Some(dir.path().to_path_buf()));

        let err = exporter
            .export_with(&roster(), |_, writer| {
                writer.write_all(b"id,name,email,groups\n").unwrap();
                writer.flush().unwrap();
                Err(ExtractError::Export("disk full".to_string()))
            })
            .unwrap_err();

        assert!(matches!(err, ExtractError::Export(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unwritable_directory_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(Some(dir.path().join("missing")));

        let err = exporter.export(&roster()).unwrap_err();
        assert!(matches!(err, ExtractError::Export(_)));
    }

    #[test]
    fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(Some(dir.path().to_path_buf()));

        let first = exporter.export(&roster()).unwrap();
        let second = exporter.export(&roster()).unwrap();
        assert_ne!(first.path(), second.path());
    }
}
