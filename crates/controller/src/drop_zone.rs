use shared::{
    domain::{FileFormat, ZoneId},
    error::ValidationError,
};

use crate::{
    effects::Effect,
    events::DragLeave,
    ingest::{IncomingFile, JobOrigin, UploadJob},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonePhase {
    Inert,
    Hover,
    /// An accepted drop is being ingested.
    Submitting,
}

#[derive(Debug)]
pub enum DropOutcome {
    Empty,
    Rejected(ValidationError),
    Accepted(UploadJob),
}

/// One drop target. Zones never look at each other's state.
#[derive(Debug, Clone)]
pub struct DropZone {
    id: ZoneId,
    overlay_present: bool,
    hovering: bool,
    submissions: usize,
}

impl DropZone {
    pub fn new(id: ZoneId) -> Self {
        Self {
            id,
            overlay_present: false,
            hovering: false,
            submissions: 0,
        }
    }

    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// Hover wins over a running submission; the zone is `Inert` only once
    /// every accepted drop has completed.
    pub fn phase(&self) -> ZonePhase {
        if self.hovering {
            ZonePhase::Hover
        } else if self.submissions > 0 {
            ZonePhase::Submitting
        } else {
            ZonePhase::Inert
        }
    }

    pub fn overlay_present(&self) -> bool {
        self.overlay_present
    }

    pub fn is_active(&self) -> bool {
        self.hovering
    }

    pub fn submissions_in_flight(&self) -> usize {
        self.submissions
    }

    pub fn drag_over(&mut self) -> Vec<Effect> {
        self.hovering = true;
        if self.overlay_present {
            return Vec::new();
        }
        self.overlay_present = true;
        vec![Effect::ShowOverlay(self.id)]
    }

    pub fn drag_leave(&mut self, leave: DragLeave) -> Vec<Effect> {
        if !leave.leaves_zone() {
            return Vec::new();
        }
        self.hovering = false;
        self.clear_overlay()
    }

    pub fn drop(&mut self, files: Vec<IncomingFile>) -> (DropOutcome, Vec<Effect>) {
        let effects = self.clear_overlay();
        self.hovering = false;
        let outcome = self.check(files);
        if matches!(outcome, DropOutcome::Accepted(_)) {
            self.submissions += 1;
        }
        (outcome, effects)
    }

    pub fn submission_finished(&mut self) {
        self.submissions = self.submissions.saturating_sub(1);
    }

    fn check(&self, mut files: Vec<IncomingFile>) -> DropOutcome {
        match files.len() {
            0 => DropOutcome::Empty,
            1 => {
                let file = files.remove(0);
                match UploadJob::validated(file, &FileFormat::ALL, JobOrigin::Zone(self.id)) {
                    Ok(job) => DropOutcome::Accepted(job),
                    Err(err) => DropOutcome::Rejected(err),
                }
            }
            count => DropOutcome::Rejected(ValidationError::MultipleFiles { count }),
        }
    }

    fn clear_overlay(&mut self) -> Vec<Effect> {
        if !self.overlay_present {
            return Vec::new();
        }
        self.overlay_present = false;
        vec![Effect::RemoveOverlay(self.id)]
    }
}
