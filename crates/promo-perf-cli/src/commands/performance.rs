use clap::Args;
use serde_json::Value;

use promo_perf_core::config::EngineConfig;
use promo_perf_core::memo::{evaluate_performance_cached, PerformanceCache};
use promo_perf_core::performance::{evaluate_performance, evaluate_promotion, PerformanceInput};
use promo_perf_core::store::InMemorySalesStore;
use promo_perf_core::{Lookback, PromotionWindow};

use crate::input;

/// Arguments for the full performance pipeline
#[derive(Args)]
pub struct PerformanceArgs {
    /// Path to JSON/YAML input file: one input object or an array of them
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for evaluating a promotion against a stored dataset
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to JSON/YAML dataset ({sales, costs})
    #[arg(long)]
    pub dataset: String,

    /// Path to JSON/YAML promotion window
    #[arg(long)]
    pub promotion: String,

    /// Baseline lookback in days (overrides config)
    #[arg(long, conflicts_with = "lookback_weeks")]
    pub lookback_days: Option<u32>,

    /// Baseline lookback in weeks (overrides config)
    #[arg(long)]
    pub lookback_weeks: Option<u32>,
}

impl EvaluateArgs {
    fn lookback(&self, config: &EngineConfig) -> Lookback {
        match (self.lookback_days, self.lookback_weeks) {
            (Some(days), _) => Lookback::Days(days),
            (None, Some(weeks)) => Lookback::Weeks(weeks),
            (None, None) => config.lookback,
        }
    }
}

pub fn run_performance(
    args: PerformanceArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Value = input::load(args.input.as_deref(), "performance analysis")?;

    match raw {
        Value::Array(items) => {
            // Repeated inputs in a batch are served from the cache
            let mut cache = PerformanceCache::from_config(&config.cache);
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                let perf_input: PerformanceInput =
                    serde_json::from_value(config.with_default_lookback(item)?)?;
                let output = evaluate_performance_cached(&mut cache, &perf_input)?;
                results.push(serde_json::to_value(output)?);
            }
            Ok(serde_json::json!({
                "results": results,
                "cache": cache.stats(),
            }))
        }
        single => {
            let perf_input: PerformanceInput =
                serde_json::from_value(config.with_default_lookback(single)?)?;
            Ok(serde_json::to_value(evaluate_performance(&perf_input)?)?)
        }
    }
}

pub fn run_evaluate(
    args: EvaluateArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let store: InMemorySalesStore = input::file::read_input(&args.dataset)?;
    let promotion: PromotionWindow = input::file::read_input(&args.promotion)?;
    let lookback = args.lookback(config);
    tracing::debug!(
        records = store.sales.len(),
        promotions = store.costs.len(),
        ?lookback,
        "dataset loaded"
    );
    let result = evaluate_promotion(&store, &promotion, lookback)?;
    Ok(serde_json::to_value(result)?)
}
