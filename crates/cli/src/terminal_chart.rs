use costdash_core::chart::{ChartBackend, ChartDataset};

const BAR_GLYPH: char = '#';

/// Renders bar charts as text. Each instance owns its rendered lines.
#[derive(Debug)]
pub struct TerminalChart {
    width: usize,
    issued: u64,
    live: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextChart {
    pub id: u64,
    pub lines: Vec<String>,
}

impl TextChart {
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl TerminalChart {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            issued: 0,
            live: 0,
        }
    }

    pub fn live_instances(&self) -> usize {
        self.live
    }
}

impl ChartBackend for TerminalChart {
    type Instance = TextChart;

    fn create(&mut self, dataset: &ChartDataset) -> anyhow::Result<TextChart> {
        anyhow::ensure!(self.width > 0, "chart width must be positive");

        let max = dataset.values.iter().copied().fold(0.0_f64, f64::max);
        let label_width = dataset
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::with_capacity(dataset.len() + 1);
        lines.push(dataset.series_label.clone());
        if dataset.is_empty() {
            lines.push("(no data)".to_string());
        }
        for (label, value) in dataset.labels.iter().zip(&dataset.values) {
            let bar_len = if max > 0.0 {
                ((value / max) * self.width as f64).round() as usize
            } else {
                0
            };
            let bar: String = std::iter::repeat(BAR_GLYPH).take(bar_len).collect();
            lines.push(format!("{label:<label_width$} | {bar} {value:.2}"));
        }

        self.issued += 1;
        self.live += 1;
        Ok(TextChart {
            id: self.issued,
            lines,
        })
    }

    fn destroy(&mut self, instance: TextChart) {
        self.live = self.live.saturating_sub(1);
        tracing::trace!(chart_id = instance.id, "terminal chart destroyed");
    }
}
