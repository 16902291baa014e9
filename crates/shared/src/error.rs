use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned by the random-query endpoint when nothing has been uploaded yet.
pub const NO_TABLES_MESSAGE: &str = "No tables found in database";

/// Rejections raised locally, before any request leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Only one file can be uploaded at a time. Please drop a single file.")]
    MultipleFiles { count: usize },
    #[error("Invalid file type. Please upload .csv, .json, or .jsonl files.")]
    UnsupportedFileType { file_name: String },
    #[error("Unknown sample type: {0}")]
    UnknownSample(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOperation {
    ExecuteQuery,
    GenerateRandomQuery,
    UploadFile,
    GetSchema,
    RemoveTable,
    ExportQueryResults,
    ExportTable,
    FetchSample,
}

/// A failure reported by the remote service, either through a response's
/// `error` field or because the call itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub operation: ServiceOperation,
    pub message: String,
}

impl ServiceError {
    pub fn new(operation: ServiceOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    pub fn is_benign(&self) -> bool {
        self.operation == ServiceOperation::GenerateRandomQuery
            && self.message == NO_TABLES_MESSAGE
    }
}
