//! Routes each event to the state machine that owns it and collects the
//! resulting effects.

use shared::{error::ServiceError, protocol::Download};
use tracing::{debug, error};

use crate::{
    effects::{Effect, NoticeBoard},
    events::{Event, ExportKind},
    ingest::UploadController,
    query::QueryController,
    schema::SchemaStore,
    ControllerConfig,
};

#[derive(Debug)]
pub struct Controller {
    query: QueryController,
    uploads: UploadController,
    schema: SchemaStore,
    notices: NoticeBoard,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            query: QueryController::new(config.debounce, config.provider),
            uploads: UploadController::new(),
            schema: SchemaStore::new(),
            notices: NoticeBoard::new(config.notice_ttl),
        }
    }

    pub fn query(&self) -> &QueryController {
        &self.query
    }

    pub fn uploads(&self) -> &UploadController {
        &self.uploads
    }

    pub fn schema(&self) -> &SchemaStore {
        &self.schema
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let effects = match event {
            Event::Started => self.schema.refresh(),

            Event::InputChanged(text) => self.query.input_changed(text),
            Event::SubmitClicked => self.query.trigger(),
            Event::KeyPressed(chord) => self.query.key_pressed(chord),
            Event::DebounceElapsed(token) => self.query.debounce_elapsed(token),
            Event::QueryCompleted(result) => self.query.query_completed(result),
            Event::RandomQueryClicked => self.query.random_requested(),
            Event::RandomQueryCompleted(result) => self.query.random_completed(result),
            Event::ExportResultsClicked => self.query.export_requested(),

            Event::DragOver(zone) => self.uploads.drag_over(zone),
            Event::DragLeft { zone, leave } => self.uploads.drag_left(zone, leave),
            Event::Dropped { zone, files } => self.uploads.dropped(zone, files),
            Event::FilePicked(file) => self.uploads.file_picked(file),
            Event::SampleRequested(sample_id) => self.uploads.sample_requested(&sample_id),
            Event::SampleFetched { dataset, result } => {
                self.uploads.sample_fetched(dataset, result)
            }
            Event::UploadCompleted { origin, result } => {
                self.uploads
                    .upload_completed(origin, result, &mut self.notices)
            }

            Event::SchemaFetched(result) => self.schema.schema_fetched(result),
            Event::RemoveTableClicked(table) => self.schema.remove_requested(table),
            Event::RemovalConfirmed(table) => self.schema.removal_confirmed(table),
            Event::RemovalDeclined(table) => self.schema.removal_declined(&table),
            Event::TableRemoved { table, result } => {
                self.schema
                    .table_removed(&table, result, &mut self.notices)
            }
            Event::ExportTableClicked(table) => vec![Effect::ExportTable(table)],
            Event::ExportCompleted { kind, result } => export_completed(kind, result),

            Event::NoticeExpired(id) => self.notices.expire(id).into_iter().collect(),
        };
        if !effects.is_empty() {
            debug!(count = effects.len(), "effects queued");
        }
        effects
    }
}

fn export_completed(
    kind: ExportKind,
    result: Result<Download, ServiceError>,
) -> Vec<Effect> {
    match result {
        Ok(download) => vec![Effect::DeliverDownload(download)],
        Err(err) => {
            let message = match kind {
                ExportKind::QueryResults => "Failed to export results",
                ExportKind::Table(_) => "Failed to export table",
            };
            error!(error = %err, ?kind, "export failed");
            vec![Effect::RenderError(message.to_string())]
        }
    }
}
