//! Query submission: debounce, single-flight execution and result dispatch,
//! plus the independent random-query action.

use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::{
    domain::{DebounceToken, LlmProvider},
    error::ServiceError,
    protocol::{QueryRequest, QueryResponse, RandomQueryResponse, ServiceReply},
};
use tracing::{debug, error, info};

use crate::{
    effects::{Effect, ResultsView},
    events::KeyChord,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySession {
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Debouncing { token: DebounceToken, text: String },
    InFlight(QuerySession),
}

#[derive(Debug)]
pub struct QueryController {
    phase: QueryPhase,
    draft: String,
    next_token: u64,
    random_in_flight: bool,
    last_response: Option<QueryResponse>,
    debounce: Duration,
    provider: LlmProvider,
}

impl QueryController {
    pub fn new(debounce: Duration, provider: LlmProvider) -> Self {
        Self {
            phase: QueryPhase::Idle,
            draft: String::new(),
            next_token: 0,
            random_in_flight: false,
            last_response: None,
            debounce,
            provider,
        }
    }

    pub fn phase(&self) -> &QueryPhase {
        &self.phase
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// The input and submit button only accept interaction while idle.
    pub fn surface_enabled(&self) -> bool {
        self.phase == QueryPhase::Idle
    }

    pub fn random_in_flight(&self) -> bool {
        self.random_in_flight
    }

    pub fn input_changed(&mut self, text: String) -> Vec<Effect> {
        if !self.surface_enabled() {
            debug!("query input is locked; edit ignored");
            return Vec::new();
        }
        self.draft = text;
        Vec::new()
    }

    pub fn key_pressed(&mut self, chord: KeyChord) -> Vec<Effect> {
        if chord.is_submit_shortcut() {
            self.trigger()
        } else {
            Vec::new()
        }
    }

    pub fn trigger(&mut self) -> Vec<Effect> {
        if matches!(self.phase, QueryPhase::InFlight(_)) {
            debug!("query already in flight; trigger dropped");
            return Vec::new();
        }
        let text = self.draft.trim();
        if text.is_empty() {
            return Vec::new();
        }
        let text = text.to_string();

        let mut effects = Vec::with_capacity(3);
        if let QueryPhase::Debouncing { token, .. } = &self.phase {
            effects.push(Effect::CancelDebounce(*token));
        }
        self.next_token += 1;
        let token = DebounceToken(self.next_token);
        self.phase = QueryPhase::Debouncing { token, text };
        effects.push(Effect::SetQuerySurface { enabled: false });
        effects.push(Effect::ScheduleDebounce {
            token,
            delay: self.debounce,
        });
        effects
    }

    pub fn debounce_elapsed(&mut self, token: DebounceToken) -> Vec<Effect> {
        let text = match &self.phase {
            QueryPhase::Debouncing { token: pending, text } if *pending == token => text.clone(),
            _ => {
                debug!(token = token.0, "stale debounce timer ignored");
                return Vec::new();
            }
        };
        let request = QueryRequest {
            query: text.clone(),
            llm_provider: self.provider,
        };
        self.phase = QueryPhase::InFlight(QuerySession {
            text,
            submitted_at: Utc::now(),
        });
        vec![Effect::ExecuteQuery(request)]
    }

    pub fn query_completed(&mut self, result: Result<QueryResponse, ServiceError>) -> Vec<Effect> {
        let session = match std::mem::replace(&mut self.phase, QueryPhase::Idle) {
            QueryPhase::InFlight(session) => session,
            other => {
                debug!("query completion without a request in flight");
                self.phase = other;
                return Vec::new();
            }
        };
        let elapsed_ms = (Utc::now() - session.submitted_at).num_milliseconds();

        let mut effects = Vec::with_capacity(3);
        match result.and_then(QueryResponse::into_result) {
            Ok(response) => {
                info!(
                    rows = response.results.len(),
                    elapsed_ms, "query completed"
                );
                effects.push(Effect::RenderResults(ResultsView::from_response(
                    &session.text,
                    &response,
                )));
                self.draft.clear();
                effects.push(Effect::SetQueryInput(String::new()));
                self.last_response = Some(response);
            }
            Err(err) => {
                error!(error = %err, elapsed_ms, "query failed");
                effects.push(Effect::RenderError(err.message));
            }
        }
        effects.push(Effect::SetQuerySurface { enabled: true });
        effects
    }

    pub fn random_requested(&mut self) -> Vec<Effect> {
        if self.random_in_flight {
            debug!("random query already in flight; click dropped");
            return Vec::new();
        }
        self.random_in_flight = true;
        vec![Effect::SetRandomBusy(true), Effect::GenerateRandomQuery]
    }

    /// The returned text always lands in the input, even alongside an error.
    pub fn random_completed(
        &mut self,
        result: Result<RandomQueryResponse, ServiceError>,
    ) -> Vec<Effect> {
        self.random_in_flight = false;
        let mut effects = Vec::with_capacity(3);
        match result {
            Ok(response) => {
                self.draft = response.query.clone();
                effects.push(Effect::SetQueryInput(response.query.clone()));
                if let Err(err) = response.into_result() {
                    if err.is_benign() {
                        debug!("random query: no tables loaded yet");
                    } else {
                        error!(error = %err, "random query failed");
                        effects.push(Effect::RenderError(err.message));
                    }
                }
            }
            Err(err) => {
                error!(error = %err, "random query failed");
                effects.push(Effect::RenderError(err.message));
            }
        }
        effects.push(Effect::SetRandomBusy(false));
        effects
    }

    /// Exports the last successful result set; nothing happens before one exists.
    pub fn export_requested(&self) -> Vec<Effect> {
        match &self.last_response {
            Some(response) if !response.results.is_empty() => vec![Effect::ExportQueryResults {
                results: response.results.clone(),
                columns: response.columns.clone(),
            }],
            _ => Vec::new(),
        }
    }
}
