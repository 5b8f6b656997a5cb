use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use promo_perf_core::config::EngineConfig;
use promo_perf_core::store::InMemorySalesStore;
use promo_perf_core::{Lookback, PromotionWindow};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

/// Optional engine configuration passed alongside an input.
fn parse_config(config_json: Option<String>) -> NapiResult<EngineConfig> {
    let config: EngineConfig = match config_json {
        Some(json) => parse(&json)?,
        None => EngineConfig::default(),
    };
    config.validate().map_err(to_napi_error)?;
    Ok(config)
}

/// Parse an input whose `lookback` falls back to the configured one.
fn parse_with_lookback<T: DeserializeOwned>(
    input_json: &str,
    config: &EngineConfig,
) -> NapiResult<T> {
    let value = config
        .with_default_lookback(parse(input_json)?)
        .map_err(to_napi_error)?;
    serde_json::from_value(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_baseline(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let input: promo_perf_core::baseline::BaselineInput =
        parse_with_lookback(&input_json, &config)?;
    let output =
        promo_perf_core::baseline::calculate_baseline(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_uplift(input_json: String) -> NapiResult<String> {
    let input: promo_perf_core::uplift::UpliftInput = parse(&input_json)?;
    let output = promo_perf_core::uplift::analyze_uplift(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn aggregate_costs(input_json: String) -> NapiResult<String> {
    let input: promo_perf_core::costs::CostInput = parse(&input_json)?;
    let output = promo_perf_core::costs::aggregate_costs(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_roi(input_json: String) -> NapiResult<String> {
    let input: promo_perf_core::roi::ProfitabilityInput = parse(&input_json)?;
    let output = promo_perf_core::roi::analyze_profitability(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct CategorizeRequest {
    #[serde(default)]
    roi: Option<Decimal>,
    #[serde(default)]
    lift_pct: Option<Decimal>,
}

#[napi]
pub fn categorize(input_json: String) -> NapiResult<String> {
    let req: CategorizeRequest = parse(&input_json)?;
    let output = promo_perf_core::categorize::categorize(req.roi, req.lift_pct);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_performance(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let input: promo_perf_core::performance::PerformanceInput =
        parse_with_lookback(&input_json, &config)?;
    let output =
        promo_perf_core::performance::evaluate_performance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct EvaluateRequest {
    dataset: InMemorySalesStore,
    promotion: PromotionWindow,
    #[serde(default)]
    lookback: Option<Lookback>,
}

/// Evaluate a promotion against a dataset ({dataset, promotion, lookback?}).
/// Lookback falls back to the configured default.
#[napi]
pub fn evaluate_promotion(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let req: EvaluateRequest = parse(&input_json)?;
    let config = parse_config(config_json)?;
    let lookback = req.lookback.unwrap_or(config.lookback);
    let output =
        promo_perf_core::performance::evaluate_promotion(&req.dataset, &req.promotion, lookback)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn run_scenarios(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: promo_perf_core::scenarios::ScenarioRunInput = parse(&input_json)?;
    let config = parse_config(config_json)?;
    let output = promo_perf_core::scenarios::run_scenarios(&input, &config.scenario)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn run_sensitivity(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: promo_perf_core::scenarios::SensitivityInput = parse(&input_json)?;
    let config = parse_config(config_json)?;
    let output = promo_perf_core::scenarios::run_sensitivity(&input, &config.scenario)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
