use std::collections::HashSet;

use shared::{
    error::ServiceError,
    protocol::{SchemaResponse, ServiceReply, TableSchema},
};
use tracing::{debug, info, warn};

use crate::effects::{Effect, NoticeBoard};

/// The complete table list as of the latest successful schema fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    tables: Vec<TableSchema>,
}

impl SchemaSnapshot {
    /// Keeps the server's order; a repeated table name keeps its first entry.
    pub fn from_tables(tables: Vec<TableSchema>) -> Self {
        let mut seen = HashSet::new();
        let tables = tables
            .into_iter()
            .filter(|table| {
                let fresh = seen.insert(table.name.clone());
                if !fresh {
                    warn!(table = %table.name, "duplicate table in schema response");
                }
                fresh
            })
            .collect();
        Self { tables }
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SchemaStore {
    snapshot: SchemaSnapshot,
    refreshes_applied: u64,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &SchemaSnapshot {
        &self.snapshot
    }

    pub fn refreshes_applied(&self) -> u64 {
        self.refreshes_applied
    }

    pub fn refresh(&mut self) -> Vec<Effect> {
        vec![Effect::FetchSchema]
    }

    /// Responses are applied in completion order, so an older request that
    /// finishes last still wins.
    pub fn schema_fetched(&mut self, result: Result<SchemaResponse, ServiceError>) -> Vec<Effect> {
        match result.and_then(SchemaResponse::into_result) {
            Ok(response) => {
                self.snapshot = SchemaSnapshot::from_tables(response.tables);
                self.refreshes_applied += 1;
                debug!(
                    tables = self.snapshot.tables.len(),
                    applied = self.refreshes_applied,
                    "schema snapshot replaced"
                );
                vec![Effect::RenderTables(self.snapshot.clone())]
            }
            Err(err) => {
                warn!(error = %err, "failed to load schema; keeping previous snapshot");
                Vec::new()
            }
        }
    }

    pub fn remove_requested(&mut self, table: String) -> Vec<Effect> {
        vec![Effect::RequestRemovalConfirmation(table)]
    }

    pub fn removal_confirmed(&mut self, table: String) -> Vec<Effect> {
        vec![Effect::DeleteTable(table)]
    }

    pub fn removal_declined(&mut self, table: &str) -> Vec<Effect> {
        debug!(table, "table removal declined");
        Vec::new()
    }

    pub fn table_removed(
        &mut self,
        table: &str,
        result: Result<(), ServiceError>,
        notices: &mut NoticeBoard,
    ) -> Vec<Effect> {
        match result {
            Ok(()) => {
                info!(table, "table removed");
                let mut effects = self.refresh();
                effects.push(notices.post(format!("Table \"{table}\" removed successfully!")));
                effects
            }
            Err(err) => {
                warn!(table, error = %err, "table removal failed");
                vec![Effect::RenderError(err.message)]
            }
        }
    }
}
