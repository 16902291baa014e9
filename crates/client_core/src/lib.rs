use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_DISPOSITION, multipart, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::SampleDataset,
    protocol::{
        Download, ExportQueryRequest, ExportTableRequest, FileUploadResponse, QueryRequest,
        QueryResponse, RandomQueryResponse, ResultRow, SchemaResponse,
    },
};
use tracing::{debug, info};
use url::Url;

pub mod error;

use error::{error_body_message, RemoteError};

const QUERY_RESULTS_FILE_NAME: &str = "query_results.csv";

/// A file picked, dropped or fetched by the client, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

/// Network boundary of the query tool. Responses that carry an `error` field
/// are returned as `Ok`; callers decide how to surface them.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn execute_query(&self, request: &QueryRequest) -> Result<QueryResponse>;
    async fn generate_random_query(&self) -> Result<RandomQueryResponse>;
    async fn upload_file(&self, file: &FileUpload) -> Result<FileUploadResponse>;
    async fn get_schema(&self) -> Result<SchemaResponse>;
    async fn remove_table(&self, table_name: &str) -> Result<()>;
    async fn export_query_results(
        &self,
        results: &[ResultRow],
        columns: &[String],
    ) -> Result<Download>;
    async fn export_table(&self, table_name: &str) -> Result<Download>;
    async fn fetch_sample(&self, dataset: SampleDataset) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpRemoteService {
    http: Client,
    server_url: Url,
}

impl HttpRemoteService {
    pub fn new(server_url: &str) -> Result<Self, RemoteError> {
        Self::with_timeout(server_url, None)
    }

    /// `timeout` applies to the whole request; `None` leaves calls unbounded.
    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let server_url = parse_server_url(server_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            server_url,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.server_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn checked(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            message: error_body_message(&body),
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        Ok(Self::checked(response).await?.json().await?)
    }

    async fn read_download(response: Response, fallback_name: &str) -> Result<Download> {
        let response = Self::checked(response).await?;
        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_file_name)
            .unwrap_or_else(|| fallback_name.to_string());
        let bytes = response.bytes().await.map_err(RemoteError::from)?;
        Ok(Download {
            file_name,
            bytes: bytes.to_vec(),
        })
    }
}

fn parse_server_url(raw: &str) -> Result<Url, RemoteError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|err| RemoteError::InvalidServerUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(RemoteError::InvalidServerUrl {
            url: raw.to_string(),
            reason: "url cannot carry a path".to_string(),
        });
    }
    Ok(url)
}

fn attachment_file_name(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let value = part.trim().strip_prefix("filename=")?;
        let value = value.trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn execute_query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        debug!(provider = %request.llm_provider, "posting query");
        let response = self
            .http
            .post(self.endpoint(&["api", "query"]))
            .json(request)
            .send()
            .await
            .map_err(RemoteError::from)
            .context("query request failed")?;
        let body: QueryResponse = Self::read_json(response)
            .await
            .context("query request failed")?;
        info!(rows = body.results.len(), "query response received");
        Ok(body)
    }

    async fn generate_random_query(&self) -> Result<RandomQueryResponse> {
        let response = self
            .http
            .get(self.endpoint(&["api", "generate-random-query"]))
            .send()
            .await
            .map_err(RemoteError::from)
            .context("random query request failed")?;
        Ok(Self::read_json(response)
            .await
            .context("random query request failed")?)
    }

    async fn upload_file(&self, file: &FileUpload) -> Result<FileUploadResponse> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type())
            .map_err(RemoteError::from)?;
        let form = multipart::Form::new().part("file", part);
        debug!(file = %file.file_name, size = file.bytes.len(), "uploading file");
        let response = self
            .http
            .post(self.endpoint(&["api", "upload"]))
            .multipart(form)
            .send()
            .await
            .map_err(RemoteError::from)
            .with_context(|| format!("upload of '{}' failed", file.file_name))?;
        Ok(Self::read_json(response)
            .await
            .with_context(|| format!("upload of '{}' failed", file.file_name))?)
    }

    async fn get_schema(&self) -> Result<SchemaResponse> {
        let response = self
            .http
            .get(self.endpoint(&["api", "schema"]))
            .send()
            .await
            .map_err(RemoteError::from)
            .context("schema request failed")?;
        Ok(Self::read_json(response)
            .await
            .context("schema request failed")?)
    }

    async fn remove_table(&self, table_name: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&["api", "table", table_name]))
            .send()
            .await
            .map_err(RemoteError::from)
            .context("Failed to remove table")?;
        Self::checked(response)
            .await
            .context("Failed to remove table")?;
        info!(table = table_name, "table removed");
        Ok(())
    }

    async fn export_query_results(
        &self,
        results: &[ResultRow],
        columns: &[String],
    ) -> Result<Download> {
        let request = ExportQueryRequest {
            data: results.to_vec(),
            columns: columns.to_vec(),
        };
        let response = self
            .http
            .post(self.endpoint(&["api", "export", "query"]))
            .json(&request)
            .send()
            .await
            .map_err(RemoteError::from)
            .context("query export failed")?;
        Self::read_download(response, QUERY_RESULTS_FILE_NAME)
            .await
            .context("query export failed")
    }

    async fn export_table(&self, table_name: &str) -> Result<Download> {
        let response = self
            .http
            .post(self.endpoint(&["api", "export", "table"]))
            .json(&ExportTableRequest {
                table_name: table_name.to_string(),
            })
            .send()
            .await
            .map_err(RemoteError::from)
            .with_context(|| format!("export of table '{table_name}' failed"))?;
        Self::read_download(response, &format!("{table_name}.csv"))
            .await
            .with_context(|| format!("export of table '{table_name}' failed"))
    }

    async fn fetch_sample(&self, dataset: SampleDataset) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.endpoint(&["sample-data", dataset.file_name()]))
            .send()
            .await
            .map_err(RemoteError::from)
            .context("Failed to load sample data")?;
        let bytes = Self::checked(response)
            .await
            .context("Failed to load sample data")?
            .bytes()
            .await
            .map_err(RemoteError::from)
            .context("Failed to load sample data")?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
