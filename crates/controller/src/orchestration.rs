//! Runs a `Controller` on tokio: render effects go to the `Renderer`, remote
//! calls and timers are spawned and report back through the session's wakeup
//! channel.

use std::{future::Future, sync::Arc, time::Duration};

use client_core::RemoteService;
use shared::{
    domain::{DebounceToken, NoticeId, ZoneId},
    error::{ServiceError, ServiceOperation},
    protocol::Download,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    effects::{Effect, ResultsView},
    events::{Event, ExportKind},
    reducer::Controller,
    schema::SchemaSnapshot,
    ControllerConfig,
};

/// The view layer. Every call is a direct consequence of one effect.
pub trait Renderer: Send {
    fn set_query_surface(&mut self, enabled: bool);
    fn set_query_input(&mut self, text: &str);
    fn set_random_busy(&mut self, busy: bool);
    fn render_results(&mut self, view: &ResultsView);
    fn render_error(&mut self, message: &str);
    fn show_overlay(&mut self, zone: ZoneId);
    fn remove_overlay(&mut self, zone: ZoneId);
    fn render_tables(&mut self, snapshot: &SchemaSnapshot);
    fn show_notice(&mut self, id: NoticeId, message: &str);
    fn dismiss_notice(&mut self, id: NoticeId);
    /// Answer with `Event::RemovalConfirmed` or `Event::RemovalDeclined`.
    fn request_removal_confirmation(&mut self, table: &str);
    fn deliver_download(&mut self, download: Download);
}

#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<Event>,
}

impl SessionHandle {
    /// Returns `false` once the session has stopped.
    pub fn send(&self, event: Event) -> bool {
        self.events.send(event).is_ok()
    }
}

/// Completions of work the session spawned itself.
#[derive(Debug)]
enum Wakeup {
    CallFinished(Event),
    TimerFired(Event),
}

pub struct Session {
    controller: Controller,
    remote: Arc<dyn RemoteService>,
    renderer: Box<dyn Renderer>,
    inbox: mpsc::UnboundedReceiver<Event>,
    inbox_closed: bool,
    wakeup_tx: mpsc::UnboundedSender<Wakeup>,
    wakeups: mpsc::UnboundedReceiver<Wakeup>,
    calls_in_flight: usize,
    debounce_timer: Option<(DebounceToken, JoinHandle<()>)>,
}

impl Session {
    pub fn new(
        config: ControllerConfig,
        remote: Arc<dyn RemoteService>,
        renderer: Box<dyn Renderer>,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (wakeup_tx, wakeups) = mpsc::unbounded_channel();
        let session = Self {
            controller: Controller::new(config),
            remote,
            renderer,
            inbox: rx,
            inbox_closed: false,
            wakeup_tx,
            wakeups,
            calls_in_flight: 0,
            debounce_timer: None,
        };
        (session, SessionHandle { events: tx })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Loads the schema, then processes events until every handle is dropped
    /// and no remote call or pending debounce is left to report back. Notice
    /// timers do not keep a closed session alive.
    pub async fn run(mut self) -> Controller {
        self.dispatch(Event::Started);
        while !(self.inbox_closed && self.is_idle()) {
            tokio::select! {
                event = self.inbox.recv(), if !self.inbox_closed => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        debug!(
                            calls = self.calls_in_flight,
                            debouncing = self.debounce_timer.is_some(),
                            "all handles dropped; draining"
                        );
                        self.inbox_closed = true;
                    }
                },
                Some(wakeup) = self.wakeups.recv() => self.wake(wakeup),
            }
        }
        info!("session closed");
        self.controller
    }

    fn is_idle(&self) -> bool {
        self.calls_in_flight == 0 && self.debounce_timer.is_none()
    }

    fn wake(&mut self, wakeup: Wakeup) {
        let event = match wakeup {
            Wakeup::CallFinished(event) => {
                self.calls_in_flight = self.calls_in_flight.saturating_sub(1);
                event
            }
            Wakeup::TimerFired(event) => {
                if let Event::DebounceElapsed(token) = &event {
                    if matches!(&self.debounce_timer, Some((pending, _)) if pending == token) {
                        self.debounce_timer = None;
                    }
                }
                event
            }
        };
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: Event) {
        for effect in self.controller.handle(event) {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SetQuerySurface { enabled } => self.renderer.set_query_surface(enabled),
            Effect::SetQueryInput(text) => self.renderer.set_query_input(&text),
            Effect::SetRandomBusy(busy) => self.renderer.set_random_busy(busy),
            Effect::RenderResults(view) => self.renderer.render_results(&view),
            Effect::RenderError(message) => self.renderer.render_error(&message),
            Effect::ShowOverlay(zone) => self.renderer.show_overlay(zone),
            Effect::RemoveOverlay(zone) => self.renderer.remove_overlay(zone),
            Effect::RenderTables(snapshot) => self.renderer.render_tables(&snapshot),
            Effect::ShowNotice {
                id,
                message,
                dismiss_after,
            } => {
                self.renderer.show_notice(id, &message);
                self.after(dismiss_after, Event::NoticeExpired(id));
            }
            Effect::DismissNotice(id) => self.renderer.dismiss_notice(id),
            Effect::RequestRemovalConfirmation(table) => {
                self.renderer.request_removal_confirmation(&table)
            }
            Effect::DeliverDownload(download) => self.renderer.deliver_download(download),

            Effect::ScheduleDebounce { token, delay } => {
                self.cancel_debounce();
                let handle = self.after(delay, Event::DebounceElapsed(token));
                self.debounce_timer = Some((token, handle));
            }
            Effect::CancelDebounce(token) => {
                if matches!(&self.debounce_timer, Some((pending, _)) if *pending == token) {
                    self.cancel_debounce();
                }
            }
            Effect::ExecuteQuery(request) => self.spawn_call(
                ServiceOperation::ExecuteQuery,
                move |remote| async move { remote.execute_query(&request).await },
                Event::QueryCompleted,
            ),
            Effect::GenerateRandomQuery => self.spawn_call(
                ServiceOperation::GenerateRandomQuery,
                |remote| async move { remote.generate_random_query().await },
                Event::RandomQueryCompleted,
            ),
            Effect::UploadFile { origin, upload } => self.spawn_call(
                ServiceOperation::UploadFile,
                move |remote| async move { remote.upload_file(&upload).await },
                move |result| Event::UploadCompleted { origin, result },
            ),
            Effect::FetchSample(dataset) => self.spawn_call(
                ServiceOperation::FetchSample,
                move |remote| async move { remote.fetch_sample(dataset).await },
                move |result| Event::SampleFetched { dataset, result },
            ),
            Effect::FetchSchema => self.spawn_call(
                ServiceOperation::GetSchema,
                |remote| async move { remote.get_schema().await },
                Event::SchemaFetched,
            ),
            Effect::DeleteTable(table) => {
                let name = table.clone();
                self.spawn_call(
                    ServiceOperation::RemoveTable,
                    move |remote| async move { remote.remove_table(&name).await },
                    move |result| Event::TableRemoved { table, result },
                )
            }
            Effect::ExportQueryResults { results, columns } => self.spawn_call(
                ServiceOperation::ExportQueryResults,
                move |remote| async move { remote.export_query_results(&results, &columns).await },
                |result| Event::ExportCompleted {
                    kind: ExportKind::QueryResults,
                    result,
                },
            ),
            Effect::ExportTable(table) => {
                let name = table.clone();
                self.spawn_call(
                    ServiceOperation::ExportTable,
                    move |remote| async move { remote.export_table(&name).await },
                    move |result| Event::ExportCompleted {
                        kind: ExportKind::Table(table),
                        result,
                    },
                )
            }
        }
    }

    fn cancel_debounce(&mut self) {
        if let Some((token, handle)) = self.debounce_timer.take() {
            debug!(token = token.0, "debounce timer cancelled");
            handle.abort();
        }
    }

    fn after(&self, delay: Duration, event: Event) -> JoinHandle<()> {
        let tx = self.wakeup_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Wakeup::TimerFired(event));
        })
    }

    fn spawn_call<T, F, Fut, C>(&mut self, operation: ServiceOperation, call: F, complete: C)
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn RemoteService>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        C: FnOnce(Result<T, ServiceError>) -> Event + Send + 'static,
    {
        let tx = self.wakeup_tx.clone();
        let remote = Arc::clone(&self.remote);
        self.calls_in_flight += 1;
        debug!(?operation, in_flight = self.calls_in_flight, "remote call started");
        tokio::spawn(async move {
            let result = call(remote)
                .await
                .map_err(|err| ServiceError::new(operation, format!("{err:#}")));
            let _ = tx.send(Wakeup::CallFinished(complete(result)));
        });
    }
}
