//! Outputs of a transition. Render effects go to the `Renderer`; the rest are
//! work items the orchestration layer runs and answers with an `Event`.

use std::{collections::BTreeSet, time::Duration};

use client_core::FileUpload;
use serde_json::Value;
use shared::{
    domain::{DebounceToken, NoticeId, SampleDataset, ZoneId},
    protocol::{Download, QueryRequest, QueryResponse, ResultRow},
};

use crate::{ingest::JobOrigin, schema::SchemaSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `false` disables the input and submit button and shows the busy indicator.
    SetQuerySurface { enabled: bool },
    SetQueryInput(String),
    SetRandomBusy(bool),
    RenderResults(ResultsView),
    RenderError(String),
    ShowOverlay(ZoneId),
    RemoveOverlay(ZoneId),
    RenderTables(SchemaSnapshot),
    ShowNotice {
        id: NoticeId,
        message: String,
        dismiss_after: Duration,
    },
    DismissNotice(NoticeId),
    RequestRemovalConfirmation(String),
    DeliverDownload(Download),

    ScheduleDebounce {
        token: DebounceToken,
        delay: Duration,
    },
    CancelDebounce(DebounceToken),
    ExecuteQuery(QueryRequest),
    GenerateRandomQuery,
    UploadFile {
        origin: JobOrigin,
        upload: FileUpload,
    },
    FetchSample(SampleDataset),
    FetchSchema,
    DeleteTable(String),
    ExportQueryResults {
        results: Vec<ResultRow>,
        columns: Vec<String>,
    },
    ExportTable(String),
}

/// A query result flattened into display text, in the response's column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub query: String,
    pub sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultsView {
    pub fn from_response(query: &str, response: &QueryResponse) -> Self {
        let rows = response
            .results
            .iter()
            .map(|row| {
                response
                    .columns
                    .iter()
                    .map(|column| cell_text(row.get(column)))
                    .collect()
            })
            .collect();
        Self {
            query: query.to_string(),
            sql: response.sql.clone(),
            columns: response.columns.clone(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Hands out notice ids and remembers which notices are still on screen.
#[derive(Debug)]
pub struct NoticeBoard {
    next_id: u64,
    active: BTreeSet<NoticeId>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            next_id: 1,
            active: BTreeSet::new(),
            ttl,
        }
    }

    pub fn post(&mut self, message: impl Into<String>) -> Effect {
        let id = NoticeId(self.next_id);
        self.next_id += 1;
        self.active.insert(id);
        Effect::ShowNotice {
            id,
            message: message.into(),
            dismiss_after: self.ttl,
        }
    }

    pub fn expire(&mut self, id: NoticeId) -> Option<Effect> {
        self.active.remove(&id).then_some(Effect::DismissNotice(id))
    }
}
