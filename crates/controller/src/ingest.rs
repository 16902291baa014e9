//! Upload jobs and the ingestion pipeline shared by drops, the file picker and
//! sample datasets.

use std::collections::BTreeMap;

use client_core::FileUpload;
use shared::{
    domain::{FileFormat, SampleDataset, ZoneId},
    error::{ServiceError, ValidationError},
    protocol::{FileUploadResponse, ServiceReply},
};
use tracing::{debug, info, warn};

use crate::{
    drop_zone::{DropOutcome, DropZone},
    effects::{Effect, NoticeBoard},
    events::DragLeave,
};

/// A file as handed over by the drop target, picker or asset fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOrigin {
    Zone(ZoneId),
    Picker,
    Sample(SampleDataset),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub name: String,
    pub bytes: Vec<u8>,
    pub declared_format: Option<FileFormat>,
    pub origin: JobOrigin,
}

impl UploadJob {
    /// Accepts the file only if its name ends with one of `accepted`.
    pub fn validated(
        file: IncomingFile,
        accepted: &[FileFormat],
        origin: JobOrigin,
    ) -> Result<Self, ValidationError> {
        match FileFormat::from_file_name(&file.name) {
            Some(format) if accepted.contains(&format) => Ok(Self {
                name: file.name,
                bytes: file.bytes,
                declared_format: Some(format),
                origin,
            }),
            _ => Err(ValidationError::UnsupportedFileType {
                file_name: file.name,
            }),
        }
    }

    /// Picker selections go straight to the backend, which owns the final say
    /// on the format.
    pub fn unchecked(file: IncomingFile, origin: JobOrigin) -> Self {
        Self {
            declared_format: FileFormat::from_file_name(&file.name),
            name: file.name,
            bytes: file.bytes,
            origin,
        }
    }

    pub fn into_effect(self) -> Effect {
        Effect::UploadFile {
            origin: self.origin,
            upload: FileUpload {
                file_name: self.name,
                bytes: self.bytes,
            },
        }
    }
}

/// Owns every drop zone and turns accepted files into upload effects.
#[derive(Debug)]
pub struct UploadController {
    zones: BTreeMap<ZoneId, DropZone>,
    in_flight: usize,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadController {
    pub fn new() -> Self {
        Self {
            zones: ZoneId::ALL
                .into_iter()
                .map(|id| (id, DropZone::new(id)))
                .collect(),
            in_flight: 0,
        }
    }

    pub fn zone(&self, id: ZoneId) -> Option<&DropZone> {
        self.zones.get(&id)
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn drag_over(&mut self, zone: ZoneId) -> Vec<Effect> {
        match self.zones.get_mut(&zone) {
            Some(drop_zone) => drop_zone.drag_over(),
            None => Vec::new(),
        }
    }

    pub fn drag_left(&mut self, zone: ZoneId, leave: DragLeave) -> Vec<Effect> {
        match self.zones.get_mut(&zone) {
            Some(drop_zone) => drop_zone.drag_leave(leave),
            None => Vec::new(),
        }
    }

    pub fn dropped(&mut self, zone: ZoneId, files: Vec<IncomingFile>) -> Vec<Effect> {
        let Some(drop_zone) = self.zones.get_mut(&zone) else {
            return Vec::new();
        };
        let (outcome, mut effects) = drop_zone.drop(files);
        match outcome {
            DropOutcome::Empty => {
                debug!(zone = zone.as_str(), "drop carried no files");
            }
            DropOutcome::Rejected(err) => {
                warn!(zone = zone.as_str(), error = %err, "drop rejected");
                effects.push(Effect::RenderError(err.to_string()));
            }
            DropOutcome::Accepted(job) => effects.push(self.ingest(job)),
        }
        effects
    }

    pub fn file_picked(&mut self, file: IncomingFile) -> Vec<Effect> {
        vec![self.ingest(UploadJob::unchecked(file, JobOrigin::Picker))]
    }

    pub fn sample_requested(&mut self, sample_id: &str) -> Vec<Effect> {
        match sample_id.parse::<SampleDataset>() {
            Ok(dataset) => {
                debug!(file = dataset.file_name(), "fetching sample dataset");
                vec![Effect::FetchSample(dataset)]
            }
            Err(err) => vec![Effect::RenderError(err.to_string())],
        }
    }

    /// Sample assets take the same validation as a dropped file of that name.
    pub fn sample_fetched(
        &mut self,
        dataset: SampleDataset,
        result: Result<Vec<u8>, ServiceError>,
    ) -> Vec<Effect> {
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => return vec![Effect::RenderError(err.message)],
        };
        let file = IncomingFile::new(dataset.file_name(), bytes);
        match UploadJob::validated(file, &FileFormat::ALL, JobOrigin::Sample(dataset)) {
            Ok(job) => vec![self.ingest(job)],
            Err(err) => vec![Effect::RenderError(err.to_string())],
        }
    }

    pub fn upload_completed(
        &mut self,
        origin: JobOrigin,
        result: Result<FileUploadResponse, ServiceError>,
        notices: &mut NoticeBoard,
    ) -> Vec<Effect> {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let JobOrigin::Zone(zone) = origin {
            if let Some(drop_zone) = self.zones.get_mut(&zone) {
                drop_zone.submission_finished();
            }
        }

        match result.and_then(FileUploadResponse::into_result) {
            Ok(response) => {
                info!(
                    table = %response.table_name,
                    rows = response.row_count,
                    "table created from upload"
                );
                vec![
                    notices.post(format!(
                        "Table \"{}\" created successfully with {} rows!",
                        response.table_name, response.row_count
                    )),
                    Effect::FetchSchema,
                ]
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                vec![Effect::RenderError(err.message)]
            }
        }
    }

    fn ingest(&mut self, job: UploadJob) -> Effect {
        self.in_flight += 1;
        debug!(file = %job.name, origin = ?job.origin, "ingesting file");
        job.into_effect()
    }
}
