//! Inputs to the controller: user gestures, browser-style drag events and
//! completions of work started by earlier effects.

use shared::{
    domain::{DebounceToken, NoticeId, SampleDataset, ZoneId},
    error::ServiceError,
    protocol::{Download, FileUploadResponse, QueryResponse, RandomQueryResponse, SchemaResponse},
};

use crate::ingest::{IncomingFile, JobOrigin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn meta(key: Key) -> Self {
        Self {
            meta: true,
            ..Self::plain(key)
        }
    }

    /// Ctrl+Enter, or Cmd+Enter on macOS.
    pub fn is_submit_shortcut(&self) -> bool {
        self.key == Key::Enter && (self.ctrl || self.meta)
    }
}

/// Where a `dragleave` came from relative to the zone that received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragLeave {
    /// The event target is the zone element itself, not one of its children.
    pub target_is_zone: bool,
    /// The element the pointer moved onto is still inside the zone.
    pub related_inside_zone: bool,
}

impl DragLeave {
    pub fn exited() -> Self {
        Self {
            target_is_zone: true,
            related_inside_zone: false,
        }
    }

    /// Pointer crossed from a child onto another element of the same zone.
    pub fn crossed_child() -> Self {
        Self {
            target_is_zone: false,
            related_inside_zone: true,
        }
    }

    pub fn leaves_zone(&self) -> bool {
        self.target_is_zone || !self.related_inside_zone
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportKind {
    QueryResults,
    Table(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started,

    InputChanged(String),
    SubmitClicked,
    KeyPressed(KeyChord),
    DebounceElapsed(DebounceToken),
    QueryCompleted(Result<QueryResponse, ServiceError>),
    RandomQueryClicked,
    RandomQueryCompleted(Result<RandomQueryResponse, ServiceError>),
    ExportResultsClicked,

    DragOver(ZoneId),
    DragLeft {
        zone: ZoneId,
        leave: DragLeave,
    },
    Dropped {
        zone: ZoneId,
        files: Vec<IncomingFile>,
    },
    FilePicked(IncomingFile),
    SampleRequested(String),
    SampleFetched {
        dataset: SampleDataset,
        result: Result<Vec<u8>, ServiceError>,
    },
    UploadCompleted {
        origin: JobOrigin,
        result: Result<FileUploadResponse, ServiceError>,
    },

    SchemaFetched(Result<SchemaResponse, ServiceError>),
    RemoveTableClicked(String),
    RemovalConfirmed(String),
    RemovalDeclined(String),
    TableRemoved {
        table: String,
        result: Result<(), ServiceError>,
    },
    ExportTableClicked(String),
    ExportCompleted {
        kind: ExportKind,
        result: Result<Download, ServiceError>,
    },

    NoticeExpired(NoticeId),
}
