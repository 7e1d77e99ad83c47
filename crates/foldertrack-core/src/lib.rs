use serde::{Deserialize, Deserializer, Serialize};

pub mod bulk;
pub mod export;
pub mod filter;
pub mod pagination;
pub mod selection;
pub mod service;
pub mod session;
pub mod speech;

// Re-export for convenience
pub use bulk::{AssignRequest, BulkAction, BulkRequest, PendingAction, ReturnRequest, ValidationError};
pub use export::{DirectorySink, ExportError, FileSink, ReportKind};
pub use filter::filtered_indices;
pub use pagination::{PAGE_SIZE, PageWindow};
pub use selection::SelectionSet;
pub use service::{FolderService, ServiceError, StartupData, load_startup};
pub use session::BrowserSession;
pub use speech::{ListenState, SpeechRecognizer, TranscriptionBridge, TranscriptionError};

/// Status value marking a folder as physically out of the store.
pub const OUT_STORE: &str = "Out Store";

/// Identity of a folder record as assigned by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        flexible_id(deserializer).map(RecordId)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical folder tracked by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hospital_number: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date_enrollment: String,
    #[serde(default, rename = "folder_status", deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub collected_by: String,
}

impl Record {
    pub fn is_out_store(&self) -> bool {
        self.status == OUT_STORE
    }

    /// Collector shown in the table: only out-of-store folders have one.
    pub fn collected_by_display(&self) -> &str {
        if self.is_out_store() {
            &self.collected_by
        } else {
            ""
        }
    }

    pub fn status_display(&self) -> &str {
        if self.status.is_empty() {
            "Not Set"
        } else {
            &self.status
        }
    }
}

/// A case manager a folder can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseManager {
    #[serde(rename = "foco_id", deserialize_with = "flexible_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub other_name: String,
}

impl CaseManager {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.other_name)
    }
}

/// Reason a folder leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purpose {
    #[serde(rename = "purpose_id", deserialize_with = "flexible_id")]
    pub id: i64,
    #[serde(rename = "purpose_name", default, deserialize_with = "lenient_text")]
    pub name: String,
}

/// Severity of an operator-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A message surfaced to the operator (modal in the TUI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "Success",
            NoticeLevel::Warning => "Warning",
            NoticeLevel::Error => "Error",
        }
    }
}

/// Accept ids sent either as JSON numbers or as numeric strings.
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {s:?}"))),
    }
}

/// Coerce any JSON scalar to its string form; `null` becomes empty.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
