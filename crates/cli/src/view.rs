use crate::terminal_chart::TextChart;
use costdash_core::dashboard::{DashboardState, LoadReport, Phase};
use costdash_core::domain::analysis::CostAnalysis;
use costdash_core::domain::cost::{CategoryTotal, CostRecord};

const TITLE: &str = "Azure Cost Dashboard";
const HEADERS: [&str; 6] = ["ID", "Resource", "Amount", "Currency", "Date", "Category"];

pub fn render_state(state: &DashboardState, chart: Option<&TextChart>) -> String {
    match state.phase {
        Phase::Loading => "Loading...".to_string(),
        Phase::Failed => format!(
            "error: {}",
            state.error_message.as_deref().unwrap_or("unknown error")
        ),
        Phase::Loaded => {
            let mut out = vec![TITLE.to_string()];
            if let Some(at) = state.loaded_at {
                out.push(format!("Refreshed {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
            }
            out.push(String::new());
            out.push(render_table(&state.costs));
            if let Some(chart) = chart {
                out.push(String::new());
                out.push(chart.render());
            }
            if let Some(analysis) = &state.analysis {
                out.push(String::new());
                out.push(render_insights(analysis));
            }
            out.join("\n")
        }
    }
}

/// Extra context for a failed load where one of the two fetches worked.
pub fn render_degraded(report: &LoadReport) -> Option<String> {
    if !report.is_partial() {
        return None;
    }
    let line = match (&report.costs, &report.analysis) {
        (Ok(costs), Err(err)) => format!(
            "{} cost records were retrieved, but the analysis is unavailable ({})",
            costs.len(),
            err.kind()
        ),
        (Err(err), Ok(analysis)) => format!(
            "analysis was retrieved (health {}/100), but cost records are unavailable ({})",
            analysis.score.overall_health,
            err.kind()
        ),
        _ => return None,
    };
    Some(line)
}

pub fn render_table(costs: &[CostRecord]) -> String {
    let rows: Vec<[String; 6]> = costs
        .iter()
        .map(|c| {
            [
                c.id.to_string(),
                c.resource_id.clone(),
                format!("{:.2}", c.cost_amount),
                c.currency.clone(),
                c.usage_date.clone(),
                c.meter_category.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = vec![format_row(&HEADERS.map(String::from), &widths)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        out.push(format_row(row, &widths));
    }
    out.join("\n")
}

fn format_row(cells: &[String; 6], widths: &[usize; 6]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

pub fn render_insights(analysis: &CostAnalysis) -> String {
    [
        "AI Cost Insights".to_string(),
        format!("Score: {}/100", analysis.score.overall_health),
        format!(
            "Risk: cost {}, waste {}",
            analysis.score.cost_risk, analysis.score.waste_risk
        ),
        format!("Explanation: {}", analysis.explanation),
    ]
    .join("\n")
}

pub fn render_category_summary(totals: &[CategoryTotal]) -> String {
    if totals.is_empty() {
        return "(no cost data)".to_string();
    }
    let width = totals
        .iter()
        .map(|t| t.meter_category.chars().count())
        .max()
        .unwrap_or(0)
        .max("Category".len());

    let mut out = vec![format!("{:<width$} | Total", "Category")];
    for t in totals {
        out.push(format!("{:<width$} | {:.2}", t.meter_category, t.total_cost));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use costdash_core::client::ApiError;
    use costdash_core::dashboard::LoadOutcome;
    use costdash_core::domain::analysis::HealthScore;
    use serde_json::json;
    use std::sync::Arc;

    fn cost(id: i64, resource_id: &str, amount: f64) -> CostRecord {
        CostRecord {
            id,
            resource_id: resource_id.to_string(),
            cost_amount: amount,
            currency: "USD".to_string(),
            usage_date: "2024-01-01".to_string(),
            meter_category: "Compute".to_string(),
        }
    }

    fn analysis() -> CostAnalysis {
        CostAnalysis {
            summary: json!({}),
            spikes: vec![],
            high_cost_resources: vec![],
            unused_resources: vec![],
            trends: json!({}),
            score: HealthScore {
                overall_health: 80.0,
                cost_risk: 20.0,
                waste_risk: 0.0,
            },
            explanation: "Stable spending".to_string(),
        }
    }

    #[test]
    fn loading_and_failed_states() {
        let mut state = DashboardState::default();
        assert_eq!(render_state(&state, None), "Loading...");

        state.phase = Phase::Failed;
        state.error_message = Some("Failed to load data".to_string());
        assert_eq!(render_state(&state, None), "error: Failed to load data");
    }

    #[test]
    fn loaded_state_shows_table_and_insights() {
        let mut state = DashboardState::default();
        state.phase = Phase::Loaded;
        state.costs = Arc::new(vec![cost(1, "vm-1", 12.5)]);
        state.analysis = Some(Arc::new(analysis()));

        let out = render_state(&state, None);
        assert!(out.starts_with("Azure Cost Dashboard"));
        assert!(out.contains("vm-1"));
        assert!(out.contains("12.50"));
        assert!(out.contains("Score: 80/100"));
        assert!(out.contains("Explanation: Stable spending"));
    }

    #[test]
    fn loaded_state_without_analysis_omits_insights() {
        let mut state = DashboardState::default();
        state.phase = Phase::Loaded;
        state.costs = Arc::new(vec![cost(1, "vm-1", 12.5)]);

        let out = render_state(&state, None);
        assert!(!out.contains("AI Cost Insights"));
    }

    #[test]
    fn table_aligns_columns_in_fetch_order() {
        let table = render_table(&[cost(2, "sql-db-01", 44.32), cost(10, "vm", 5.6)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "ID | Resource  | Amount | Currency | Date       | Category"
        );
        assert!(lines[2].starts_with("2  | sql-db-01 | 44.32"));
        assert!(lines[3].starts_with("10 | vm        | 5.60"));
    }

    #[test]
    fn degraded_notice_names_the_failed_side() {
        let report = LoadReport {
            seq: 1,
            outcome: LoadOutcome::Applied(Phase::Failed),
            costs: Ok(Arc::new(vec![cost(1, "vm-1", 12.5)])),
            analysis: Err(ApiError::Decode {
                url: "http://127.0.0.1:8000/costs/analysis".to_string(),
                detail: "missing field `score`".to_string(),
            }),
        };
        let notice = render_degraded(&report).unwrap();
        assert!(notice.starts_with("1 cost records were retrieved"));
        assert!(notice.contains("DecodeError"));
    }

    #[test]
    fn degraded_notice_absent_when_both_fail() {
        let err = ApiError::Network {
            url: "http://127.0.0.1:8000/costs".to_string(),
            detail: "connection refused".to_string(),
        };
        let report = LoadReport {
            seq: 1,
            outcome: LoadOutcome::Applied(Phase::Failed),
            costs: Err(err.clone()),
            analysis: Err(err),
        };
        assert!(render_degraded(&report).is_none());
    }

    #[test]
    fn category_summary_table() {
        let out = render_category_summary(&[
            CategoryTotal {
                meter_category: "Compute".to_string(),
                total_cost: 37.44,
            },
            CategoryTotal {
                meter_category: "Storage".to_string(),
                total_cost: 5.6,
            },
        ]);
        assert_eq!(
            out,
            "Category | Total\nCompute  | 37.44\nStorage  | 5.60"
        );
        assert_eq!(render_category_summary(&[]), "(no cost data)");
    }
}
