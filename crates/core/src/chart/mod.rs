use crate::domain::cost::CostRecord;
use std::sync::Arc;

pub const SERIES_LABEL: &str = "Cost Amount";

/// Bar chart input: one bar per cost record, in fetch order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    pub series_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartDataset {
    pub fn from_costs(costs: &[CostRecord]) -> Self {
        Self {
            series_label: SERIES_LABEL.to_string(),
            labels: costs.iter().map(|c| c.resource_id.clone()).collect(),
            values: costs.iter().map(|c| c.cost_amount).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A drawing surface that hands out chart instances. Instances hold surface
/// resources and must be passed back to `destroy` exactly once.
pub trait ChartBackend {
    type Instance;

    fn create(&mut self, dataset: &ChartDataset) -> anyhow::Result<Self::Instance>;

    fn destroy(&mut self, instance: Self::Instance);
}

/// Owns at most one live chart instance. The old instance is destroyed before
/// a new one is created, and whatever is live is destroyed on drop.
pub struct ChartAdapter<B: ChartBackend> {
    backend: B,
    current: Option<B::Instance>,
    source: Option<Arc<Vec<CostRecord>>>,
}

impl<B: ChartBackend> ChartAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
            source: None,
        }
    }

    pub fn render(&mut self, costs: &[CostRecord]) -> anyhow::Result<()> {
        let dataset = ChartDataset::from_costs(costs);
        self.source = None;
        self.release();

        let instance = self.backend.create(&dataset)?;
        self.current = Some(instance);
        tracing::debug!(bars = dataset.len(), "chart rendered");
        Ok(())
    }

    /// Re-renders only when `costs` is a different allocation than the one
    /// last rendered. Returns whether a render happened.
    pub fn sync(&mut self, costs: &Arc<Vec<CostRecord>>) -> anyhow::Result<bool> {
        if let Some(source) = &self.source {
            if Arc::ptr_eq(source, costs) && self.current.is_some() {
                return Ok(false);
            }
        }

        self.render(costs)?;
        self.source = Some(Arc::clone(costs));
        Ok(true)
    }

    /// Safe to call any number of times.
    pub fn dispose(&mut self) {
        self.source = None;
        self.release();
    }

    pub fn is_rendered(&self) -> bool {
        self.current.is_some()
    }

    pub fn instance(&self) -> Option<&B::Instance> {
        self.current.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn release(&mut self) {
        if let Some(old) = self.current.take() {
            self.backend.destroy(old);
            tracing::debug!("chart instance released");
        }
    }
}

impl<B: ChartBackend> Drop for ChartAdapter<B> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    pub(crate) struct Counts {
        pub live: usize,
        pub created: usize,
        pub destroyed: usize,
        pub last_dataset: Option<ChartDataset>,
        pub fail_next_create: bool,
    }

    /// Tracks live instances so tests can check for leaks.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct CountingBackend {
        pub counts: Rc<RefCell<Counts>>,
    }

    impl ChartBackend for CountingBackend {
        type Instance = usize;

        fn create(&mut self, dataset: &ChartDataset) -> anyhow::Result<usize> {
            let mut counts = self.counts.borrow_mut();
            if counts.fail_next_create {
                counts.fail_next_create = false;
                anyhow::bail!("surface unavailable");
            }
            counts.live += 1;
            counts.created += 1;
            counts.last_dataset = Some(dataset.clone());
            Ok(counts.created)
        }

        fn destroy(&mut self, _instance: usize) {
            let mut counts = self.counts.borrow_mut();
            assert!(counts.live > 0, "destroy called with no live instance");
            counts.live -= 1;
            counts.destroyed += 1;
        }
    }
}
