use crate::domain::analysis::CostAnalysis;
use crate::domain::cost::CostRecord;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Loaded,
    Failed,
}

/// Snapshot handed to views. `costs` keeps its `Arc` identity until a load
/// succeeds, so views can detect data changes with `Arc::ptr_eq`.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub phase: Phase,
    pub costs: Arc<Vec<CostRecord>>,
    pub analysis: Option<Arc<CostAnalysis>>,
    pub error_message: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    latest_seq: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            phase: Phase::Loading,
            costs: Arc::new(Vec::new()),
            analysis: None,
            error_message: None,
            loaded_at: None,
            latest_seq: 0,
        }
    }
}

impl DashboardState {
    /// Sequence number of the most recently started load.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub(crate) fn begin_load(&mut self) -> u64 {
        self.latest_seq += 1;
        self.phase = Phase::Loading;
        self.error_message = None;
        self.latest_seq
    }

    pub(crate) fn is_current(&self, seq: u64) -> bool {
        self.latest_seq == seq
    }

    pub(crate) fn complete(
        &mut self,
        costs: Arc<Vec<CostRecord>>,
        analysis: Arc<CostAnalysis>,
        loaded_at: DateTime<Utc>,
    ) {
        self.costs = costs;
        self.analysis = Some(analysis);
        self.loaded_at = Some(loaded_at);
        self.error_message = None;
        self.phase = Phase::Loaded;
    }

    // costs/analysis keep whatever the last successful load produced.
    pub(crate) fn fail(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
        self.phase = Phase::Failed;
    }
}
