//! Report downloads: fetch a generated spreadsheet and save it to disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::service::{FolderService, ServiceError};

/// The two server-generated reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Overdue,
    Collected,
}

impl ReportKind {
    pub fn all() -> &'static [ReportKind] {
        &[ReportKind::Overdue, ReportKind::Collected]
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Overdue => "/overdue-folders",
            Self::Collected => "/allcollectedfolders",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            Self::Overdue => "overdue_folders.xlsx",
            Self::Collected => "Collected_folders.xlsx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue folders",
            Self::Collected => "Collected folders",
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("report request failed: {0}")]
    Service(#[from] ServiceError),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Host-level "save as file" primitive.
pub trait FileSink: Send + Sync {
    /// Persist `bytes` under the suggested `filename`; returns where it went.
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}

/// Saves files into a fixed directory, creating it when missing.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform download directory, or the working directory when there is none.
    pub fn default_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Fetch `kind` and hand it to `sink`.
pub async fn export_report(
    service: &dyn FolderService,
    sink: &dyn FileSink,
    kind: ReportKind,
) -> Result<PathBuf, ExportError> {
    let bytes = service.export_report(kind).await?;
    let path = sink.save(kind.filename(), &bytes)?;
    tracing::info!(report = kind.label(), path = %path.display(), bytes = bytes.len(), "report saved");
    Ok(path)
}

/// Export that only logs on failure: report downloads never raise an
/// operator notice, unlike every other remote failure.
pub async fn run_export(
    service: &dyn FolderService,
    sink: &dyn FileSink,
    kind: ReportKind,
) -> Option<PathBuf> {
    match export_report(service, sink, kind).await {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::error!(report = kind.label(), error = %e, "error downloading report");
            None
        }
    }
}
