use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub id: i64,
    pub resource_id: String,
    pub cost_amount: f64,
    pub currency: String,
    /// Backend-formatted date, display only.
    pub usage_date: String,
    #[serde(rename = "meterCategory")]
    pub meter_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    #[serde(rename = "meterCategory")]
    pub meter_category: String,
    pub total_cost: f64,
}

/// Checks the per-batch invariants: unique ids and non-negative finite amounts.
pub fn validate_batch(records: &[CostRecord]) -> anyhow::Result<()> {
    let mut seen_ids = BTreeSet::<i64>::new();
    for record in records {
        anyhow::ensure!(
            seen_ids.insert(record.id),
            "duplicate cost record id: {}",
            record.id
        );
        anyhow::ensure!(
            record.cost_amount.is_finite() && record.cost_amount >= 0.0,
            "cost_amount must be a non-negative number (id={}, got {})",
            record.id,
            record.cost_amount
        );
    }
    Ok(())
}
