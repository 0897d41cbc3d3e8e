// src/controller.rs
//! Request lifecycle: one analysis request in flight at a time, a client-side
//! deadline, and last-submission-wins commits.
//!
//! Every submission gets a generation number and a cancellation token. Starting a
//! new submission bumps the generation and cancels the previous token; a resolution
//! only commits while its generation is still the current one.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use metrics::{counter, histogram};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::AnalysisError;
use crate::model::{
    AnalysisRequest, Article, ResultSet, ServicePayload, WireRequest, MAX_RESULT_LIMIT,
    MIN_RESULT_LIMIT,
};
use crate::notice::{is_expired, NoticeTicket, NoticeTimer};
use crate::sorter::{ResultSorter, SortKey, SortState};
use crate::telemetry::ensure_metrics_described;
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Observable lifecycle of the current submission.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Pending { deadline: Instant },
    Succeeded(ResultSet),
    Failed {
        reason: AnalysisError,
        expires_at: Instant,
    },
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending { .. })
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            RequestState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            RequestState::Succeeded(set) => Some(set),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Pending { .. } => "pending",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed { .. } => "failed",
        }
    }
}

/// Map a transport result onto the outcome taxonomy.
/// Order: transport failure, non-2xx status, unparseable body, error payload, articles.
pub fn classify(res: Result<TransportResponse>) -> Result<ResultSet, AnalysisError> {
    let resp = res.map_err(|e| AnalysisError::Transport(format!("{e:#}")))?;
    if !resp.is_success() {
        return Err(AnalysisError::Transport(format!("HTTP status {}", resp.status)));
    }
    let payload: ServicePayload = serde_json::from_str(resp.body.trim())
        .map_err(|e| AnalysisError::Transport(format!("malformed response body: {e}")))?;
    match payload {
        ServicePayload::Failure { error } => Err(AnalysisError::Service(error)),
        ServicePayload::Articles(items) => Ok(ResultSet::from_wire(items)),
    }
}

struct Inner {
    generation: u64,
    in_flight: Option<CancellationToken>,
    state: RequestState,
    /// Last successful result set; kept across later failures.
    last_results: Option<ResultSet>,
    notice: NoticeTimer,
    sorter: ResultSorter,
}

impl Inner {
    /// Invalidate whatever is in flight and hand out a fresh generation.
    fn supersede(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        if let Some(prev) = self.in_flight.take() {
            prev.cancel();
        }
        self.generation
    }

    fn fail(&mut self, reason: AnalysisError, now: Instant) -> NoticeTicket {
        let ticket = self.notice.arm(now);
        self.state = RequestState::Failed {
            reason,
            expires_at: ticket.expires_at,
        };
        ticket
    }

    /// Drop an expired error back to Idle. Returns true when the state changed.
    fn expire_if_due(&mut self, now: Instant) -> bool {
        let due = matches!(
            &self.state,
            RequestState::Failed { expires_at, .. } if is_expired(*expires_at, now)
        );
        if due {
            self.state = RequestState::Idle;
            self.notice.disarm();
        }
        due
    }
}

struct Shared {
    inner: Mutex<Inner>,
    tx: watch::Sender<RequestState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("controller state mutex poisoned")
    }

    fn publish(&self, state: RequestState) {
        self.tx.send_replace(state);
    }

    fn expire_notice(&self, ticket: NoticeTicket) {
        let mut inner = self.lock();
        if !inner.notice.is_current(&ticket) {
            return;
        }
        if inner.expire_if_due(Instant::now()) {
            drop(inner);
            debug!(target: "analysis", "error message expired");
            self.publish(RequestState::Idle);
        }
    }
}

struct Prepared {
    url: String,
    variant: String,
    body: WireRequest,
}

/// Owns request state, the last result set and the table's sort state.
pub struct RequestController {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    shared: Arc<Shared>,
}

impl RequestController {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let (tx, _rx) = watch::channel(RequestState::Idle);
        let inner = Inner {
            generation: 0,
            in_flight: None,
            state: RequestState::Idle,
            last_results: None,
            notice: NoticeTimer::new(config.error_display()),
            sorter: ResultSorter::new(),
        };
        Self {
            config: Arc::new(config),
            transport,
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                tx,
            }),
        }
    }

    /// Controller talking to the configured service over HTTP.
    pub fn with_http(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new()?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Receiver that sees every state transition, including error expiry.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.shared.tx.subscribe()
    }

    /// Current state. An error past its display time reads as `Idle`.
    pub fn state(&self) -> RequestState {
        let mut inner = self.shared.lock();
        let changed = inner.expire_if_due(Instant::now());
        let state = inner.state.clone();
        drop(inner);
        if changed {
            self.shared.publish(state.clone());
        }
        state
    }

    /// Text for the message slot, if an error is currently visible.
    pub fn error_message(&self) -> Option<String> {
        self.state().error().map(ToString::to_string)
    }

    pub fn is_pending(&self) -> bool {
        self.state().is_pending()
    }

    /// Last successful result set, in server order.
    pub fn results(&self) -> Option<ResultSet> {
        self.shared.lock().last_results.clone()
    }

    pub fn sort_by(&self, key: SortKey) {
        self.shared.lock().sorter.sort_by(key);
    }

    pub fn sort_state(&self) -> SortState {
        self.shared.lock().sorter.state()
    }

    /// Last successful result set under the current sort state.
    pub fn sorted_results(&self) -> Vec<Article> {
        let inner = self.shared.lock();
        let Some(set) = inner.last_results.as_ref() else {
            return Vec::new();
        };
        inner
            .sorter
            .view(set.articles())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run one submission to completion and return the state afterwards.
    ///
    /// A submission superseded while in flight commits nothing; the returned state
    /// is then whatever the newer submission has produced so far.
    pub async fn submit(&self, request: AnalysisRequest) -> RequestState {
        ensure_metrics_described();
        counter!("analysis_submissions_total").increment(1);

        let prepared = match self.prepare(&request) {
            Ok(p) => p,
            Err(reason) => {
                debug!(target: "analysis", %reason, "submission rejected by validation");
                self.reject(reason);
                return self.state();
            }
        };

        let deadline = Instant::now() + self.config.timeout();
        let (generation, token) = self.begin(deadline);
        info!(
            target: "analysis",
            generation,
            variant = %prepared.variant,
            transport = self.transport.name(),
            url = %prepared.url,
            "analysis request dispatched"
        );

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            _ = tokio::time::sleep_until(deadline) => {
                Some(Err(AnalysisError::Timeout(self.config.timeout())))
            }
            res = self.transport.post_json(&prepared.url, &prepared.body) => Some(classify(res)),
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!("analysis_request_ms").record(elapsed_ms);

        match outcome {
            None => {
                counter!("analysis_superseded_total").increment(1);
                debug!(target: "analysis", generation, "request cancelled by newer submission");
            }
            Some(result) => self.commit(generation, result, elapsed_ms),
        }
        self.state()
    }

    fn prepare(&self, request: &AnalysisRequest) -> Result<Prepared, AnalysisError> {
        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(AnalysisError::empty_subject());
        }
        if !(MIN_RESULT_LIMIT..=MAX_RESULT_LIMIT).contains(&request.result_limit) {
            return Err(AnalysisError::Validation(format!(
                "Result limit must be between {MIN_RESULT_LIMIT} and {MAX_RESULT_LIMIT}."
            )));
        }
        let variant = match request.variant.as_deref() {
            Some(name) => self.config.variant(name).ok_or_else(|| {
                AnalysisError::Validation(format!("Unknown analysis variant '{name}'."))
            })?,
            None => self.config.fallback_variant().ok_or_else(|| {
                AnalysisError::Validation("No analysis variant is configured.".to_string())
            })?,
        };
        if variant.supports_language && !self.config.supports_language(request.language) {
            return Err(AnalysisError::Validation(format!(
                "Language '{}' is not available.",
                request.language
            )));
        }

        Ok(Prepared {
            url: self.config.endpoint_url(variant),
            variant: variant.name.clone(),
            body: WireRequest {
                bank_name: subject.to_string(),
                language: variant.supports_language.then_some(request.language),
                limit: variant.supports_limit.then_some(request.result_limit),
            },
        })
    }

    fn begin(&self, deadline: Instant) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let mut inner = self.shared.lock();
        let generation = inner.supersede();
        inner.in_flight = Some(token.clone());
        inner.notice.disarm();
        inner.state = RequestState::Pending { deadline };
        let state = inner.state.clone();
        drop(inner);
        self.shared.publish(state);
        (generation, token)
    }

    /// Validation failure: counts as a submission, so it also supersedes.
    fn reject(&self, reason: AnalysisError) {
        counter!("analysis_outcomes_total", "outcome" => reason.kind().as_str()).increment(1);
        let mut inner = self.shared.lock();
        inner.supersede();
        let ticket = inner.fail(reason, Instant::now());
        let state = inner.state.clone();
        drop(inner);
        self.shared.publish(state);
        self.arm_expiry(ticket);
    }

    fn commit(&self, generation: u64, result: Result<ResultSet, AnalysisError>, elapsed_ms: f64) {
        let mut inner = self.shared.lock();
        if inner.generation != generation {
            drop(inner);
            counter!("analysis_superseded_total").increment(1);
            debug!(target: "analysis", generation, "stale resolution discarded");
            return;
        }
        inner.in_flight = None;

        let ticket = match result {
            Ok(set) => {
                info!(
                    target: "analysis",
                    generation,
                    articles = set.len(),
                    elapsed_ms,
                    "analysis succeeded"
                );
                counter!("analysis_outcomes_total", "outcome" => "success").increment(1);
                inner.notice.disarm();
                inner.last_results = Some(set.clone());
                inner.state = RequestState::Succeeded(set);
                None
            }
            Err(reason) => {
                warn!(
                    target: "analysis",
                    generation,
                    outcome = reason.kind().as_str(),
                    detail = reason.detail().unwrap_or_default(),
                    elapsed_ms,
                    "analysis failed: {reason}"
                );
                counter!("analysis_outcomes_total", "outcome" => reason.kind().as_str())
                    .increment(1);
                Some(inner.fail(reason, Instant::now()))
            }
        };
        debug!(target: "analysis", state = inner.state.label(), "state committed");
        let state = inner.state.clone();
        drop(inner);
        self.shared.publish(state);
        if let Some(ticket) = ticket {
            self.arm_expiry(ticket);
        }
    }

    fn arm_expiry(&self, ticket: NoticeTicket) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep_until(ticket.expires_at).await;
            shared.expire_notice(ticket);
        });
    }
}
