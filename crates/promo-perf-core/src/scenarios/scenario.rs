use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::categorize::RoiCategory;
use crate::config::ScenarioConfig;
use crate::error::PromoPerfError;
use crate::types::*;
use crate::uplift::Uplift;
use crate::PromoPerfResult;

use super::model::{predict, ScenarioOverrides, ScenarioParameters};

/// A named variant of the base parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedScenario {
    pub name: String,
    #[serde(default)]
    pub overrides: ScenarioOverrides,
}

/// Input for scenario comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRunInput {
    pub base: ScenarioParameters,
    pub scenarios: Vec<NamedScenario>,
}

/// Result for a single scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    /// Base merged with overrides and configured defaults
    pub parameters: ScenarioParameters,
    pub predicted: VolumeRevenue,
    pub uplift: Uplift,
    pub total_cost: Money,
    pub gross_profit: Money,
    pub roi: Percent,
    pub roi_category: RoiCategory,
    pub risk_score: Decimal,
}

/// Names of the extreme scenarios. Ties go to the earliest in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub best_roi: String,
    pub lowest_risk: String,
    pub highest_volume_uplift: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub scenario: String,
    pub roi: Percent,
    /// Fixed placeholder from configuration, not a fitted confidence
    pub confidence: Decimal,
    pub rationale: String,
}

/// Output of scenario comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRunOutput {
    pub outcomes: Vec<ScenarioOutcome>,
    pub comparison: ScenarioComparison,
    pub recommendation: Recommendation,
}

/// Index of the first element whose key is strictly better than every
/// earlier one under `better`.
fn first_extreme<T, K, F, B>(items: &[T], key: F, better: B) -> usize
where
    K: Copy,
    F: Fn(&T) -> K,
    B: Fn(K, K) -> bool,
{
    let mut best = 0;
    for (i, item) in items.iter().enumerate().skip(1) {
        if better(key(item), key(&items[best])) {
            best = i;
        }
    }
    best
}

/// Positions of the best-ROI, lowest-risk and highest-volume outcomes.
struct Extremes {
    best_roi: usize,
    lowest_risk: usize,
    highest_volume: usize,
}

fn extremes(outcomes: &[ScenarioOutcome]) -> PromoPerfResult<Extremes> {
    if outcomes.is_empty() {
        return Err(PromoPerfError::InsufficientData(
            "At least one scenario outcome required".into(),
        ));
    }
    Ok(Extremes {
        best_roi: first_extreme(outcomes, |o| o.roi, |a, b| a > b),
        lowest_risk: first_extreme(outcomes, |o| o.risk_score, |a, b| a < b),
        highest_volume: first_extreme(outcomes, |o| o.uplift.incremental_volume, |a, b| a > b),
    })
}

impl Extremes {
    fn names(&self, outcomes: &[ScenarioOutcome]) -> ScenarioComparison {
        ScenarioComparison {
            best_roi: outcomes[self.best_roi].name.clone(),
            lowest_risk: outcomes[self.lowest_risk].name.clone(),
            highest_volume_uplift: outcomes[self.highest_volume].name.clone(),
        }
    }
}

pub fn compare_outcomes(outcomes: &[ScenarioOutcome]) -> PromoPerfResult<ScenarioComparison> {
    Ok(extremes(outcomes)?.names(outcomes))
}

pub fn run_scenario(
    name: &str,
    parameters: &ScenarioParameters,
    config: &ScenarioConfig,
) -> PromoPerfResult<ScenarioOutcome> {
    let parameters = parameters.resolved(config);
    let prediction = predict(&parameters).map_err(|e| match e {
        PromoPerfError::InvalidInput { field, reason } => PromoPerfError::InvalidInput {
            field: format!("scenario:{name} {field}"),
            reason,
        },
        other => other,
    })?;
    let risk_score = parameters.risk_score.unwrap_or(config.risk_score);

    Ok(ScenarioOutcome {
        name: name.to_string(),
        predicted: prediction.predicted,
        uplift: prediction.uplift,
        total_cost: prediction.total_cost,
        gross_profit: prediction.profitability.gross_profit,
        roi: prediction.profitability.roi,
        roi_category: prediction.roi_category,
        risk_score,
        parameters,
    })
}

/// Run every named scenario through the prediction pipeline and compare.
///
/// The recommendation is always the best-ROI scenario, carrying the
/// configured confidence.
pub fn run_scenarios(
    input: &ScenarioRunInput,
    config: &ScenarioConfig,
) -> PromoPerfResult<ComputationOutput<ScenarioRunOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.scenarios.is_empty() {
        return Err(PromoPerfError::InsufficientData(
            "At least one scenario required".into(),
        ));
    }

    let mut outcomes: Vec<ScenarioOutcome> = Vec::with_capacity(input.scenarios.len());
    for scenario in &input.scenarios {
        if outcomes.iter().any(|o| o.name == scenario.name) {
            warnings.push(format!(
                "Scenario name '{}' is repeated; comparison names are ambiguous",
                scenario.name
            ));
        }
        let params = input.base.apply(&scenario.overrides);
        let outcome = run_scenario(&scenario.name, &params, config)?;
        if outcome.total_cost.is_zero() {
            warnings.push(format!(
                "Scenario '{}' has zero investment; ROI reported as 0",
                scenario.name
            ));
        }
        tracing::debug!(
            scenario = %scenario.name,
            roi = %outcome.roi,
            "scenario evaluated"
        );
        outcomes.push(outcome);
    }

    let extremes = extremes(&outcomes)?;
    let comparison = extremes.names(&outcomes);
    let best = &outcomes[extremes.best_roi];

    let distinct_risk = outcomes.iter().any(|o| o.risk_score != outcomes[0].risk_score);
    if !distinct_risk && outcomes.len() > 1 {
        warnings.push(
            "All scenarios share the same risk score; lowest_risk is the first scenario".into(),
        );
    }

    let recommendation = Recommendation {
        scenario: best.name.clone(),
        roi: best.roi,
        confidence: config.recommendation_confidence,
        rationale: "Highest predicted ROI".into(),
    };

    let output = ScenarioRunOutput {
        outcomes,
        comparison,
        recommendation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "What-If Promotion Scenario Comparison",
        &serde_json::json!({
            "num_scenarios": input.scenarios.len(),
            "default_elasticity": config.elasticity.to_string(),
            "default_risk_score": config.risk_score.to_string(),
            "tie_break": "first in input order",
        }),
        warnings,
        elapsed,
        output,
    ))
}
