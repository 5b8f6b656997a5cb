use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::ScenarioConfig;
use crate::error::PromoPerfError;
use crate::types::*;
use crate::PromoPerfResult;

use super::model::{predict, ScenarioParameters, ScenarioPrediction, ScenarioVariable};

const MAX_SWEEP_POINTS: usize = 1_000;

/// Output measure read from each evaluated grid point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMetric {
    #[default]
    Roi,
    GrossProfit,
    IncrementalVolume,
    IncrementalRevenue,
    TotalCost,
}

impl ScenarioMetric {
    fn read(&self, p: &ScenarioPrediction) -> Decimal {
        match self {
            ScenarioMetric::Roi => p.profitability.roi,
            ScenarioMetric::GrossProfit => p.profitability.gross_profit,
            ScenarioMetric::IncrementalVolume => p.uplift.incremental_volume,
            ScenarioMetric::IncrementalRevenue => p.uplift.incremental_revenue,
            ScenarioMetric::TotalCost => p.total_cost,
        }
    }
}

/// One swept parameter and its range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityAxis {
    pub variable: ScenarioVariable,
    #[serde(flatten)]
    pub range: SensitivityRange,
}

/// Input for 1- or 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub base: ScenarioParameters,
    pub variable_1: SensitivityAxis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_2: Option<SensitivityAxis>,
    #[serde(default)]
    pub metric: ScenarioMetric,
}

/// Output of sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1: ScenarioVariable,
    pub variable_2: Option<ScenarioVariable>,
    pub variable_1_values: Vec<Decimal>,
    /// Empty for a one-way sweep
    pub variable_2_values: Vec<Decimal>,
    pub metric: ScenarioMetric,
    /// matrix[i][j] = metric at variable_1_values[i], variable_2_values[j];
    /// one column for a one-way sweep
    pub matrix: Vec<Vec<Decimal>>,
    pub base_case_value: Decimal,
    /// Grid point closest to the midpoint of each range (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a range from min to max with step.
fn generate_sweep_values(axis: &SensitivityAxis) -> PromoPerfResult<Vec<Decimal>> {
    let range = &axis.range;
    let field = format!("variable:{}", axis.variable.label());
    if range.step <= Decimal::ZERO {
        return Err(PromoPerfError::InvalidInput {
            field,
            reason: "Step must be positive".into(),
        });
    }
    if range.min > range.max {
        return Err(PromoPerfError::InvalidInput {
            field,
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = range.min;
    while current <= range.max {
        if values.len() >= MAX_SWEEP_POINTS {
            return Err(PromoPerfError::InvalidInput {
                field,
                reason: format!("Sweep exceeds {MAX_SWEEP_POINTS} points"),
            });
        }
        values.push(current);
        current += range.step;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < range.max {
            values.push(range.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn midpoint(range: &SensitivityRange) -> Decimal {
    (range.min + range.max) / dec!(2)
}

/// Sweep one or two parameters over the scenario pipeline.
///
/// Points that fail validation are recorded as 0 with a warning rather
/// than aborting the grid.
pub fn run_sensitivity(
    input: &SensitivityInput,
    config: &ScenarioConfig,
) -> PromoPerfResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(v2) = &input.variable_2 {
        if v2.variable == input.variable_1.variable {
            return Err(PromoPerfError::InvalidInput {
                field: "variable_2".into(),
                reason: "Must differ from variable_1".into(),
            });
        }
    }

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = match &input.variable_2 {
        Some(axis) => generate_sweep_values(axis)?,
        None => Vec::new(),
    };
    let base = input.base.resolved(config);

    let evaluate = |v1: Decimal, v2: Option<Decimal>| -> PromoPerfResult<Decimal> {
        let mut params = base.with_variable(input.variable_1.variable, v1)?;
        if let (Some(axis), Some(v2)) = (&input.variable_2, v2) {
            params = params.with_variable(axis.variable, v2)?;
        }
        Ok(input.metric.read(&predict(&params)?))
    };

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let columns: Vec<Option<Decimal>> = if v2_values.is_empty() {
            vec![None]
        } else {
            v2_values.iter().copied().map(Some).collect()
        };
        let mut row = Vec::with_capacity(columns.len());
        for v2 in columns {
            match evaluate(*v1, v2) {
                Ok(val) => row.push(val),
                Err(e) => {
                    let at = match v2 {
                        Some(v2) => format!("({v1}, {v2})"),
                        None => format!("({v1})"),
                    };
                    warnings.push(format!("Evaluation failed at {at}: {e}"));
                    row.push(Decimal::ZERO);
                }
            }
        }
        matrix.push(row);
    }

    let base_row = closest_index(&v1_values, midpoint(&input.variable_1.range));
    let base_col = input
        .variable_2
        .as_ref()
        .map(|axis| closest_index(&v2_values, midpoint(&axis.range)))
        .unwrap_or(0);
    let base_case_value = matrix[base_row][base_col];

    let output = SensitivityOutput {
        variable_1: input.variable_1.variable,
        variable_2: input.variable_2.as_ref().map(|a| a.variable),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        metric: input.metric,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        if input.variable_2.is_some() {
            "2-Way Promotion Sensitivity Analysis"
        } else {
            "1-Way Promotion Sensitivity Analysis"
        },
        &serde_json::json!({
            "variable_1": input.variable_1.variable,
            "variable_2": input.variable_2.as_ref().map(|a| a.variable),
            "metric": input.metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
