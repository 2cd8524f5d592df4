pub mod state;

use crate::client::{ApiError, CostApi};
use crate::domain::analysis::CostAnalysis;
use crate::domain::cost::CostRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

pub use state::{DashboardState, Phase, LOAD_FAILED_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// This load wrote the state; carries the resulting phase.
    Applied(Phase),
    /// A newer load started before this one finished; nothing was written.
    Superseded,
    /// The dashboard was closed while this load was in flight.
    Discarded,
}

/// Both fetch results of one load, independent of what the state kept.
/// Lets a view degrade gracefully when only one side failed.
#[derive(Debug)]
pub struct LoadReport {
    pub seq: u64,
    pub outcome: LoadOutcome,
    pub costs: Result<Arc<Vec<CostRecord>>, ApiError>,
    pub analysis: Result<Arc<CostAnalysis>, ApiError>,
}

impl LoadReport {
    pub fn is_partial(&self) -> bool {
        self.costs.is_ok() != self.analysis.is_ok()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ApiError> {
        self.costs
            .as_ref()
            .err()
            .into_iter()
            .chain(self.analysis.as_ref().err())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dashboard has been closed")]
pub struct DashboardClosed;

/// Coordinates the cost and analysis fetches and owns the state snapshot.
///
/// Every `load` takes a sequence number when it starts; only the load holding
/// the latest number may write the state once both fetches settle. All state
/// writes go through the watch channel, so subscribers always see a whole
/// snapshot.
pub struct Dashboard<A> {
    api: A,
    state: watch::Sender<DashboardState>,
    closed: AtomicBool,
}

impl<A: CostApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: watch::Sender::new(DashboardState::default()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Marks the owning view as gone. Loads still in flight finish their
    /// requests but never write the state.
    pub fn close(&self) {
        // Taken under the channel lock so no commit can interleave.
        self.state.send_if_modified(|_| {
            self.closed.store(true, Ordering::Release);
            false
        });
    }

    pub async fn load(&self) -> Result<LoadReport, DashboardClosed> {
        if self.is_closed() {
            return Err(DashboardClosed);
        }

        let mut seq = 0;
        self.state.send_modify(|s| seq = s.begin_load());
        tracing::debug!(seq, "dashboard load started");

        let (costs, analysis) =
            tokio::join!(self.api.fetch_costs(), self.api.fetch_cost_analysis());
        let costs = costs.map(Arc::new);
        let analysis = analysis.map(Arc::new);

        let mut outcome = LoadOutcome::Discarded;
        self.state.send_if_modified(|s| {
            if self.is_closed() {
                outcome = LoadOutcome::Discarded;
                return false;
            }
            if !s.is_current(seq) {
                outcome = LoadOutcome::Superseded;
                return false;
            }

            match (&costs, &analysis) {
                (Ok(c), Ok(a)) => s.complete(Arc::clone(c), Arc::clone(a), chrono::Utc::now()),
                _ => s.fail(LOAD_FAILED_MESSAGE),
            }
            outcome = LoadOutcome::Applied(s.phase);
            true
        });

        let report = LoadReport {
            seq,
            outcome,
            costs,
            analysis,
        };

        match report.outcome {
            LoadOutcome::Applied(Phase::Loaded) => {
                let records = report.costs.as_ref().map(|c| c.len()).unwrap_or_default();
                tracing::info!(seq, records, "dashboard loaded");
            }
            LoadOutcome::Applied(_) => {
                for err in report.errors() {
                    tracing::warn!(seq, kind = err.kind(), error = %err, "dashboard load failed");
                }
            }
            LoadOutcome::Superseded => {
                tracing::debug!(seq, "stale dashboard load discarded");
            }
            LoadOutcome::Discarded => {
                tracing::debug!(seq, "dashboard closed during load; result discarded");
            }
        }

        Ok(report)
    }
}
