//! Application State - shared, read-only collaborators of every request

use crate::core::{AppError, Config, ExtractError};
use crate::export::CsvExporter;
use crate::lms::LmsClient;
use crate::views::Views;
use sqlx::MySqlPool;

pub struct AppState {
    pub config: Config,

    /// HTTP client for the LMS API, built once with the configured timeout
    pub lms: LmsClient,

    pub exporter: CsvExporter,

    pub views: Views,

    /// Optional pool; the export workflow never touches it
    pub db: Option<MySqlPool>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Option<MySqlPool>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let lms = LmsClient::new(&config)?;
        let exporter = CsvExporter::new(config.export_dir.clone());
        let views = Views::new()?;

        Ok(Self {
            config,
            lms,
            exporter,
            views,
            db,
        })
    }

    /// Converts a pipeline error honouring the `verbose_errors` setting
    pub fn fail(&self, err: ExtractError) -> AppError {
        AppError::from_extract(err, self.config.verbose_errors)
    }
}
