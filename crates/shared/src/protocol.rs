use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::LlmProvider,
    error::{ServiceError, ServiceOperation},
};

pub type ResultRow = Map<String, Value>;

/// Responses that report failure through an optional `error` field instead of
/// an HTTP status.
pub trait ServiceReply: Sized {
    const OPERATION: ServiceOperation;

    fn error_field(&self) -> Option<&str>;

    fn error_message(&self) -> Option<&str> {
        self.error_field().filter(|message| !message.trim().is_empty())
    }

    fn into_result(self) -> Result<Self, ServiceError> {
        if let Some(message) = self.error_message() {
            return Err(ServiceError::new(Self::OPERATION, message));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub llm_provider: LlmProvider,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub sql: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub results: Vec<ResultRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceReply for QueryResponse {
    const OPERATION: ServiceOperation = ServiceOperation::ExecuteQuery;

    fn error_field(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RandomQueryResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceReply for RandomQueryResponse {
    const OPERATION: ServiceOperation = ServiceOperation::GenerateRandomQuery;

    fn error_field(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn summary(&self) -> String {
        format!("{} rows, {} columns", self.row_count, self.columns.len())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileUploadResponse {
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceReply for FileUploadResponse {
    const OPERATION: ServiceOperation = ServiceOperation::UploadFile;

    fn error_field(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaResponse {
    #[serde(default)]
    pub tables: Vec<TableSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tables: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceReply for SchemaResponse {
    const OPERATION: ServiceOperation = ServiceOperation::GetSchema;

    fn error_field(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportQueryRequest {
    pub data: Vec<ResultRow>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTableRequest {
    pub table_name: String,
}

/// A file the renderer should hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
