use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use promo_perf_core::config::EngineConfig;
use promo_perf_core::scenarios::{
    self, ScenarioMetric, ScenarioParameters, ScenarioRunInput, ScenarioVariable, SensitivityAxis,
    SensitivityInput,
};
use promo_perf_core::SensitivityRange;

use crate::input;

/// Arguments for what-if scenario comparison
#[derive(Args)]
pub struct ScenariosArgs {
    /// Path to JSON/YAML input file ({base, scenarios})
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a complete sensitivity input file
    #[arg(long, conflicts_with = "base_inputs")]
    pub input: Option<String>,

    /// Path to JSON/YAML file with base case scenario parameters
    #[arg(long, requires = "var1")]
    pub base_inputs: Option<String>,

    /// First sensitivity variable in format name:min:max:step
    /// (e.g. "discount_pct:5:25:5")
    #[arg(long)]
    pub var1: Option<String>,

    /// Second sensitivity variable (optional, creates a 2D grid)
    #[arg(long)]
    pub var2: Option<String>,

    /// Output metric: roi, gross_profit, incremental_volume,
    /// incremental_revenue, total_cost
    #[arg(long, default_value = "roi")]
    pub metric: String,
}

fn parse_variable(name: &str) -> Result<ScenarioVariable, Box<dyn std::error::Error>> {
    serde_json::from_value(Value::String(name.to_string())).map_err(|_| {
        format!(
            "Unknown variable '{}'. Available: discount_pct, duration_weeks, investment, \
             elasticity, unit_price",
            name
        )
        .into()
    })
}

fn parse_metric(name: &str) -> Result<ScenarioMetric, Box<dyn std::error::Error>> {
    serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| format!("Unknown metric '{}'", name).into())
}

fn parse_sens_var(spec: &str) -> Result<SensitivityAxis, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            spec
        )
        .into());
    }
    Ok(SensitivityAxis {
        variable: parse_variable(parts[0])?,
        range: SensitivityRange {
            min: parts[1].parse::<Decimal>()?,
            max: parts[2].parse::<Decimal>()?,
            step: parts[3].parse::<Decimal>()?,
        },
    })
}

pub fn run_scenarios(
    args: ScenariosArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sc_input: ScenarioRunInput = input::load(args.input.as_deref(), "scenario comparison")?;
    let result = scenarios::run_scenarios(&sc_input, &config.scenario)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_sensitivity(
    args: SensitivityArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input = match (&args.base_inputs, &args.var1) {
        (Some(path), Some(var1)) => {
            let base: ScenarioParameters = input::file::read_input(path)?;
            SensitivityInput {
                base,
                variable_1: parse_sens_var(var1)?,
                variable_2: args.var2.as_deref().map(parse_sens_var).transpose()?,
                metric: parse_metric(&args.metric)?,
            }
        }
        _ => input::load(args.input.as_deref(), "sensitivity analysis")?,
    };
    let result = scenarios::run_sensitivity(&sens_input, &config.scenario)?;
    Ok(serde_json::to_value(result)?)
}
