use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::categorize::{categorize_lift, categorize_roi, LiftCategory, RoiCategory};
use crate::config::ScenarioConfig;
use crate::costs::CostBreakdown;
use crate::error::PromoPerfError;
use crate::roi::{calculate_profitability, Profitability};
use crate::types::*;
use crate::uplift::{calculate_uplift, Uplift};
use crate::PromoPerfResult;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// What-if promotion parameters. `elasticity` and `risk_score` fall back
/// to the configured defaults when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// Units sold per week without a promotion
    pub weekly_baseline_volume: Units,
    /// List price per unit
    pub unit_price: Money,
    /// Cost of goods per unit
    #[serde(default)]
    pub unit_cost: Money,
    /// Discount off list price, in percentage points
    #[serde(default)]
    pub discount_pct: Percent,
    pub duration_weeks: u32,
    /// Fixed marketing investment
    #[serde(default)]
    pub investment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<Decimal>,
}

/// Partial override merged onto base parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_baseline_volume: Option<Units>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Money>,
    #[serde(alias = "discount", skip_serializing_if = "Option::is_none")]
    pub discount_pct: Option<Percent>,
    #[serde(alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elasticity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<Decimal>,
}

/// A parameter that can be swept in sensitivity analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioVariable {
    DiscountPct,
    DurationWeeks,
    Investment,
    Elasticity,
    UnitPrice,
}

impl ScenarioVariable {
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioVariable::DiscountPct => "discount_pct",
            ScenarioVariable::DurationWeeks => "duration_weeks",
            ScenarioVariable::Investment => "investment",
            ScenarioVariable::Elasticity => "elasticity",
            ScenarioVariable::UnitPrice => "unit_price",
        }
    }
}

impl ScenarioParameters {
    pub fn apply(&self, overrides: &ScenarioOverrides) -> Self {
        let mut p = self.clone();
        if let Some(v) = overrides.weekly_baseline_volume {
            p.weekly_baseline_volume = v;
        }
        if let Some(v) = overrides.unit_price {
            p.unit_price = v;
        }
        if let Some(v) = overrides.unit_cost {
            p.unit_cost = v;
        }
        if let Some(v) = overrides.discount_pct {
            p.discount_pct = v;
        }
        if let Some(v) = overrides.duration_weeks {
            p.duration_weeks = v;
        }
        if let Some(v) = overrides.investment {
            p.investment = v;
        }
        if overrides.elasticity.is_some() {
            p.elasticity = overrides.elasticity;
        }
        if overrides.risk_score.is_some() {
            p.risk_score = overrides.risk_score;
        }
        p
    }

    /// Copy with defaults from `config` written into the optional fields.
    pub fn resolved(&self, config: &ScenarioConfig) -> Self {
        let mut p = self.clone();
        p.elasticity = Some(self.elasticity.unwrap_or(config.elasticity));
        p.risk_score = Some(self.risk_score.unwrap_or(config.risk_score));
        p
    }

    pub fn with_variable(&self, variable: ScenarioVariable, value: Decimal) -> PromoPerfResult<Self> {
        let mut p = self.clone();
        match variable {
            ScenarioVariable::DiscountPct => p.discount_pct = value,
            ScenarioVariable::Investment => p.investment = value,
            ScenarioVariable::Elasticity => p.elasticity = Some(value),
            ScenarioVariable::UnitPrice => p.unit_price = value,
            ScenarioVariable::DurationWeeks => {
                p.duration_weeks = value
                    .fract()
                    .is_zero()
                    .then(|| value.to_u32())
                    .flatten()
                    .ok_or_else(|| PromoPerfError::InvalidInput {
                        field: "duration_weeks".into(),
                        reason: format!("Duration must be a whole number of weeks (got {value})"),
                    })?;
            }
        }
        Ok(p)
    }

    pub fn validate(&self) -> PromoPerfResult<()> {
        if self.duration_weeks == 0 {
            return Err(PromoPerfError::InvalidInput {
                field: "duration_weeks".into(),
                reason: "Duration must be at least one week".into(),
            });
        }
        if self.discount_pct < Decimal::ZERO || self.discount_pct > Decimal::ONE_HUNDRED {
            return Err(PromoPerfError::InvalidInput {
                field: "discount_pct".into(),
                reason: format!("Discount must be between 0 and 100 (got {})", self.discount_pct),
            });
        }
        if self.weekly_baseline_volume < Decimal::ZERO {
            return Err(PromoPerfError::InvalidInput {
                field: "weekly_baseline_volume".into(),
                reason: "Baseline volume cannot be negative".into(),
            });
        }
        if self.unit_price < Decimal::ZERO {
            return Err(PromoPerfError::InvalidInput {
                field: "unit_price".into(),
                reason: "Unit price cannot be negative".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Predicted outcome of one parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPrediction {
    pub baseline: VolumeRevenue,
    pub predicted: VolumeRevenue,
    /// List price net of the discount, as seen by the shopper
    pub promoted_unit_price: Money,
    pub costs: CostBreakdown,
    pub total_cost: Money,
    pub uplift: Uplift,
    pub profitability: Profitability,
    pub roi_category: RoiCategory,
    pub lift_category: LiftCategory,
}

fn checked_product(a: Decimal, b: Decimal, field: &str) -> PromoPerfResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| PromoPerfError::InvalidInput {
        field: field.into(),
        reason: format!("{a} x {b} exceeds the representable decimal range"),
    })
}

/// Run the uplift/cost/ROI calculators over a resolved parameter set.
///
/// Volume lift is `discount_pct * elasticity` percentage points. Revenue
/// is valued at list price; the discount is carried as a trade-spend cost
/// alongside the fixed investment.
pub fn predict(params: &ScenarioParameters) -> PromoPerfResult<ScenarioPrediction> {
    params.validate()?;
    let elasticity = params.elasticity.ok_or_else(|| PromoPerfError::InvalidInput {
        field: "elasticity".into(),
        reason: "Unresolved elasticity".into(),
    })?;

    let weeks = Decimal::from(params.duration_weeks);
    let baseline_volume =
        checked_product(params.weekly_baseline_volume, weeks, "weekly_baseline_volume")?;
    let lift_pct = checked_product(params.discount_pct, elasticity, "elasticity")?;
    let predicted_volume = checked_product(
        baseline_volume,
        Decimal::ONE + lift_pct / Decimal::ONE_HUNDRED,
        "elasticity",
    )?;

    let baseline = VolumeRevenue {
        volume: baseline_volume,
        revenue: checked_product(baseline_volume, params.unit_price, "unit_price")?,
    };
    let predicted = VolumeRevenue {
        volume: predicted_volume,
        revenue: checked_product(predicted_volume, params.unit_price, "unit_price")?,
    };

    let costs = CostBreakdown {
        discount_cost: checked_product(predicted.revenue, params.discount_pct, "discount_pct")?
            / Decimal::ONE_HUNDRED,
        marketing_cost: params.investment,
        ..CostBreakdown::default()
    };
    let total_cost = costs.total();

    let uplift = calculate_uplift(baseline, predicted);
    let incremental_product_cost =
        checked_product(uplift.incremental_volume, params.unit_cost, "unit_cost")?;
    let profitability =
        calculate_profitability(uplift.incremental_revenue, total_cost, incremental_product_cost);

    Ok(ScenarioPrediction {
        baseline,
        predicted,
        promoted_unit_price: params.unit_price
            * (Decimal::ONE - params.discount_pct / Decimal::ONE_HUNDRED),
        costs,
        total_cost,
        uplift,
        roi_category: categorize_roi(profitability.roi),
        lift_category: categorize_lift(uplift.volume_lift_pct),
        profitability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_params() -> ScenarioParameters {
        ScenarioParameters {
            weekly_baseline_volume: dec!(1000),
            unit_price: dec!(10),
            unit_cost: dec!(0),
            discount_pct: dec!(10),
            duration_weeks: 4,
            investment: dec!(2800),
            elasticity: Some(dec!(3)),
            risk_score: None,
        }
    }

    #[test]
    fn test_prediction_known_answer() {
        let p = predict(&base_params()).unwrap();
        assert_eq!(p.baseline.volume, dec!(4000));
        assert_eq!(p.predicted.volume, dec!(5200));
        assert_eq!(p.promoted_unit_price, dec!(9));
        assert_eq!(p.uplift.volume_lift_pct, dec!(30));
        assert_eq!(p.uplift.incremental_revenue, dec!(12000));
        // discount 5200 + investment 2800
        assert_eq!(p.total_cost, dec!(8000));
        assert_eq!(p.profitability.gross_profit, dec!(4000));
        assert_eq!(p.profitability.roi, dec!(50));
        assert_eq!(p.roi_category, RoiCategory::Excellent);
    }

    #[test]
    fn test_overrides_merge() {
        let o: ScenarioOverrides = serde_json::from_str(r#"{"discount": 20, "duration": 6}"#).unwrap();
        let p = base_params().apply(&o);
        assert_eq!(p.discount_pct, dec!(20));
        assert_eq!(p.duration_weeks, 6);
        assert_eq!(p.unit_price, dec!(10));
    }

    #[test]
    fn test_unknown_override_rejected() {
        let r: Result<ScenarioOverrides, _> = serde_json::from_str(r#"{"discout": 20}"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_resolution_only_fills_missing() {
        let cfg = ScenarioConfig::default();
        let p = base_params().resolved(&cfg);
        assert_eq!(p.elasticity, Some(dec!(3)));
        assert_eq!(p.risk_score, Some(dec!(5.5)));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut p = base_params();
        p.duration_weeks = 0;
        assert!(predict(&p).is_err());
    }

    #[test]
    fn test_fractional_duration_rejected() {
        assert!(base_params()
            .with_variable(ScenarioVariable::DurationWeeks, dec!(2.5))
            .is_err());
        let p = base_params()
            .with_variable(ScenarioVariable::DurationWeeks, dec!(8))
            .unwrap();
        assert_eq!(p.duration_weeks, 8);
    }

    #[test]
    fn test_revenue_overflow_is_invalid_input() {
        let mut p = base_params();
        p.weekly_baseline_volume = "10000000000000000000000000".parse().unwrap();
        p.unit_price = dec!(100000);
        match predict(&p) {
            Err(PromoPerfError::InvalidInput { field, .. }) => assert_eq!(field, "unit_price"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_no_discount_no_investment() {
        let mut p = base_params();
        p.discount_pct = dec!(0);
        p.investment = dec!(0);
        let pred = predict(&p).unwrap();
        assert_eq!(pred.total_cost, Decimal::ZERO);
        assert_eq!(pred.profitability.roi, Decimal::ZERO);
        assert_eq!(pred.uplift.incremental_volume, Decimal::ZERO);
    }
}
