use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use promo_perf_core::baseline::{self, BaselineInput};
use promo_perf_core::categorize;
use promo_perf_core::config::EngineConfig;
use promo_perf_core::costs::{self, CostInput};
use promo_perf_core::roi::{self, ProfitabilityInput};
use promo_perf_core::uplift::{self, UpliftInput};

use crate::input;

/// Arguments for baseline estimation
#[derive(Args)]
pub struct BaselineArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for uplift calculation
#[derive(Args)]
pub struct UpliftArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for cost aggregation
#[derive(Args)]
pub struct CostsArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for ROI / profitability
#[derive(Args)]
pub struct RoiArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for categorisation
#[derive(Args)]
pub struct CategorizeArgs {
    /// ROI in percentage points
    #[arg(long, allow_hyphen_values = true)]
    pub roi: Option<Decimal>,

    /// Volume lift in percentage points
    #[arg(long, allow_hyphen_values = true)]
    pub lift: Option<Decimal>,
}

pub fn run_baseline(
    args: BaselineArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Value = input::load(args.input.as_deref(), "baseline estimation")?;
    let bl_input: BaselineInput = serde_json::from_value(config.with_default_lookback(raw)?)?;
    let result = baseline::calculate_baseline(&bl_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_uplift(args: UpliftArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let up_input: UpliftInput = input::load(args.input.as_deref(), "uplift calculation")?;
    let result = uplift::analyze_uplift(&up_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_costs(args: CostsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cost_input: CostInput = input::load(args.input.as_deref(), "cost aggregation")?;
    let result = costs::aggregate_costs(&cost_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_roi(args: RoiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let roi_input: ProfitabilityInput = input::load(args.input.as_deref(), "ROI calculation")?;
    let result = roi::analyze_profitability(&roi_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_categorize(args: CategorizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.roi.is_none() && args.lift.is_none() {
        return Err("--roi and/or --lift required for categorisation".into());
    }
    let result = categorize::categorize(args.roi, args.lift);
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_requires_a_value() {
        let args = CategorizeArgs {
            roi: None,
            lift: None,
        };
        assert!(run_categorize(args).is_err());
    }

    #[test]
    fn test_categorize_flags() {
        let args = CategorizeArgs {
            roi: Some(Decimal::new(30, 0)),
            lift: Some(Decimal::new(-2, 0)),
        };
        let v = run_categorize(args).unwrap();
        assert_eq!(v["roi_category"], "good");
        assert_eq!(v["lift_category"], "negative");
    }
}
