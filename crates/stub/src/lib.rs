use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use costdash_core::domain::analysis::CostAnalysis;
use costdash_core::domain::cost::{validate_batch, CategoryTotal, CostRecord};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const SEED_COSTS: &str = include_str!("../fixtures/costs.json");
const SEED_ANALYSIS: &str = include_str!("../fixtures/analysis.json");
const LATEST_LIMIT: usize = 20;

/// Canned backend content. The analysis is served as-is and is not derived
/// from the records.
#[derive(Debug, Clone)]
pub struct StubData {
    pub costs: Vec<CostRecord>,
    pub analysis: CostAnalysis,
}

impl StubData {
    pub fn seeded() -> anyhow::Result<Self> {
        Self::parse(SEED_COSTS, SEED_ANALYSIS)
    }

    /// Seed data with either document replaced by a JSON file.
    pub fn from_files(
        costs_path: Option<&std::path::Path>,
        analysis_path: Option<&std::path::Path>,
    ) -> anyhow::Result<Self> {
        let costs = match costs_path {
            Some(p) => std::fs::read_to_string(p)
                .with_context(|| format!("failed to read cost fixture {}", p.display()))?,
            None => SEED_COSTS.to_string(),
        };
        let analysis = match analysis_path {
            Some(p) => std::fs::read_to_string(p)
                .with_context(|| format!("failed to read analysis fixture {}", p.display()))?,
            None => SEED_ANALYSIS.to_string(),
        };
        Self::parse(&costs, &analysis)
    }

    fn parse(costs: &str, analysis: &str) -> anyhow::Result<Self> {
        let costs: Vec<CostRecord> =
            serde_json::from_str(costs).context("cost fixture is not a list of cost records")?;
        validate_batch(&costs)?;
        let analysis: CostAnalysis =
            serde_json::from_str(analysis).context("analysis fixture has the wrong shape")?;
        Ok(Self { costs, analysis })
    }

    pub fn latest(&self) -> Vec<CostRecord> {
        let mut out = self.costs.clone();
        // Stable sort: ties keep insertion order.
        out.sort_by(|a, b| b.usage_date.cmp(&a.usage_date));
        out.truncate(LATEST_LIMIT);
        out
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        let mut totals = BTreeMap::<&str, f64>::new();
        for c in &self.costs {
            *totals.entry(c.meter_category.as_str()).or_default() += c.cost_amount;
        }
        totals
            .into_iter()
            .map(|(category, total_cost)| CategoryTotal {
                meter_category: category.to_string(),
                total_cost,
            })
            .collect()
    }

    pub fn for_resource(&self, resource_id: &str) -> Vec<CostRecord> {
        self.costs
            .iter()
            .filter(|c| c.resource_id == resource_id)
            .cloned()
            .collect()
    }

    /// Inclusive on both ends; dates compare as ISO strings.
    pub fn between(&self, start: &str, end: &str) -> Vec<CostRecord> {
        self.costs
            .iter()
            .filter(|c| c.usage_date.as_str() >= start && c.usage_date.as_str() <= end)
            .cloned()
            .collect()
    }
}

pub fn build_router(data: StubData) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/costs", get(get_all_costs))
        .route("/costs/latest", get(get_latest_costs))
        .route("/costs/summary", get(get_cost_summary))
        .route("/costs/resource/:resource_id", get(get_costs_for_resource))
        .route("/costs/dates", get(get_costs_between))
        .route("/costs/analysis", get(get_cost_analysis))
        .with_state(Arc::new(data))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

type AppState = Arc<StubData>;

async fn root() -> Json<Value> {
    Json(json!({"message": "API is running"}))
}

async fn get_all_costs(State(data): State<AppState>) -> Json<Vec<CostRecord>> {
    Json(data.costs.clone())
}

async fn get_latest_costs(State(data): State<AppState>) -> Json<Vec<CostRecord>> {
    Json(data.latest())
}

async fn get_cost_summary(State(data): State<AppState>) -> Json<Vec<CategoryTotal>> {
    Json(data.category_totals())
}

async fn get_costs_for_resource(
    State(data): State<AppState>,
    Path(resource_id): Path<String>,
) -> Json<Vec<CostRecord>> {
    Json(data.for_resource(&resource_id))
}

#[derive(Debug, Deserialize)]
struct DateRange {
    start: String,
    end: String,
}

async fn get_costs_between(
    State(data): State<AppState>,
    Query(range): Query<DateRange>,
) -> Json<Vec<CostRecord>> {
    Json(data.between(&range.start, &range.end))
}

async fn get_cost_analysis(State(data): State<AppState>) -> Json<CostAnalysis> {
    Json(data.analysis.clone())
}
