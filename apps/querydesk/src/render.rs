//! Prints controller output to the terminal.

use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use controller::{Renderer, ResultsView, SchemaSnapshot};
use shared::{
    domain::{NoticeId, ZoneId},
    protocol::{Download, TableSchema},
};
use tracing::{debug, error, info};

/// State the command loop reads back from the renderer.
#[derive(Debug, Default)]
struct TerminalState {
    pending_removal: Option<String>,
    query_locked: bool,
    tables: Vec<TableSchema>,
}

#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<Mutex<TerminalState>>);

impl SharedState {
    fn lock(&self) -> MutexGuard<'_, TerminalState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn take_pending_removal(&self) -> Option<String> {
        self.lock().pending_removal.take()
    }

    /// True between a submit and its completion, while typed text is ignored.
    pub fn query_locked(&self) -> bool {
        self.lock().query_locked
    }

    pub fn tables_text(&self) -> String {
        format_tables(&self.lock().tables)
    }
}

pub struct TerminalRenderer {
    state: SharedState,
    download_dir: PathBuf,
}

impl TerminalRenderer {
    pub fn new(state: SharedState, download_dir: PathBuf) -> Self {
        Self {
            state,
            download_dir,
        }
    }
}

impl Renderer for TerminalRenderer {
    fn set_query_surface(&mut self, enabled: bool) {
        self.state.lock().query_locked = !enabled;
        if !enabled {
            println!("… working");
        }
    }

    fn set_query_input(&mut self, text: &str) {
        if !text.is_empty() {
            println!("input: {text}  (:run to submit)");
        }
    }

    fn set_random_busy(&mut self, busy: bool) {
        debug!(busy, "random query busy");
    }

    fn render_results(&mut self, view: &ResultsView) {
        println!("{}", format_results(view));
    }

    fn render_error(&mut self, message: &str) {
        println!("error: {message}");
    }

    fn show_overlay(&mut self, zone: ZoneId) {
        debug!(zone = zone.as_str(), "drop overlay shown");
    }

    fn remove_overlay(&mut self, zone: ZoneId) {
        debug!(zone = zone.as_str(), "drop overlay removed");
    }

    fn render_tables(&mut self, snapshot: &SchemaSnapshot) {
        self.state.lock().tables = snapshot.tables().to_vec();
        println!("{}", format_tables(snapshot.tables()));
    }

    fn show_notice(&mut self, id: NoticeId, message: &str) {
        debug!(id = id.0, "notice shown");
        println!("✓ {message}");
    }

    fn dismiss_notice(&mut self, id: NoticeId) {
        debug!(id = id.0, "notice dismissed");
    }

    fn request_removal_confirmation(&mut self, table: &str) {
        self.state.lock().pending_removal = Some(table.to_string());
        println!("Are you sure you want to remove table \"{table}\"? [y/N]");
    }

    fn deliver_download(&mut self, download: Download) {
        let path = self.download_dir.join(&download.file_name);
        match fs::write(&path, &download.bytes) {
            Ok(()) => {
                info!(path = %path.display(), bytes = download.bytes.len(), "download saved");
                println!("saved {}", path.display());
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to save download");
                println!("error: could not save {}: {err}", path.display());
            }
        }
    }
}

pub fn format_results(view: &ResultsView) -> String {
    let mut out = format!("Query: {}\nSQL: {}\n", view.query, view.sql);
    if view.is_empty() {
        out.push_str("No results found.");
        return out;
    }

    let widths: Vec<usize> = view
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            view.rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain([column.chars().count()])
                .max()
                .unwrap_or_default()
        })
        .collect();

    out.push_str(&format_row(view.columns.iter(), &widths));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &view.rows {
        out.push('\n');
        out.push_str(&format_row(row.iter(), &widths));
    }
    out
}

fn format_row<'a>(cells: impl Iterator<Item = &'a String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

pub fn format_tables(tables: &[TableSchema]) -> String {
    if tables.is_empty() {
        return "No tables loaded yet.".to_string();
    }
    let mut out = String::from("Tables:");
    for table in tables {
        out.push_str(&format!("\n  {} ({})", table.name, table.summary()));
        for column in &table.columns {
            out.push_str(&format!("\n    - {}: {}", column.name, column.data_type));
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
