use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend-computed report. Everything except `score` and `explanation` is
/// passed through as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub summary: Value,
    pub spikes: Vec<Value>,
    pub high_cost_resources: Vec<Value>,
    pub unused_resources: Vec<Value>,
    pub trends: Value,
    pub score: HealthScore,
    pub explanation: String,
}

/// Scores are trusted as provided; nominal range is 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall_health: f64,
    pub cost_risk: f64,
    pub waste_risk: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_analysis_and_keeps_opaque_fields() {
        let v = json!({
            "summary": {"total_cost": 87.36, "currency": "USD", "num_records": 4},
            "spikes": [{"from_date": "2025-12-01", "to_date": "2025-12-02", "severity": "high"}],
            "high_cost_resources": [],
            "unused_resources": [],
            "trends": {"overall_change_percent": null},
            "score": {"overall_health": 80, "cost_risk": 20, "waste_risk": 0},
            "explanation": "Stable spending"
        });

        let parsed: CostAnalysis = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.score.overall_health, 80.0);
        assert_eq!(parsed.score.cost_risk, 20.0);
        assert_eq!(parsed.summary["num_records"], 4);
        assert_eq!(parsed.spikes[0]["severity"], "high");
        assert!(parsed.trends["overall_change_percent"].is_null());
        assert_eq!(parsed.explanation, "Stable spending");
    }

    #[test]
    fn rejects_analysis_without_score() {
        let v = json!({
            "summary": {},
            "spikes": [],
            "high_cost_resources": [],
            "unused_resources": [],
            "trends": {},
            "explanation": "no score"
        });

        assert!(serde_json::from_value::<CostAnalysis>(v).is_err());
    }
}
