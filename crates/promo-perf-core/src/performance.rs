use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::baseline::{estimate_baseline, BaselineEstimate, BaselineWindow};
use crate::categorize::{categorize_lift, categorize_roi, LiftCategory, RoiCategory};
use crate::costs::{negative_cost_warnings, CostBreakdown};
use crate::error::PromoPerfError;
use crate::roi::calculate_profitability;
use crate::store::SalesSource;
use crate::types::*;
use crate::uplift::calculate_uplift;
use crate::PromoPerfResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the pipeline needs, fully materialised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceInput {
    pub promotion: PromotionWindow,
    /// History covering at least the baseline window and the promotion
    pub sales: Vec<SalesRecord>,
    #[serde(default)]
    pub lookback: Lookback,
    #[serde(default)]
    pub costs: CostBreakdown,
}

/// Promotion performance, recomputable from its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub baseline_window: BaselineWindow,
    pub baseline_records: usize,
    pub promoted_records: usize,
    /// Baseline average projected over the promoted records
    pub baseline_volume: Units,
    pub baseline_revenue: Money,
    pub promoted_volume: Units,
    pub promoted_revenue: Money,
    pub incremental_volume: Units,
    pub incremental_revenue: Money,
    pub volume_lift_pct: Percent,
    pub revenue_lift_pct: Percent,
    pub baseline_was_zero: bool,
    pub cost_breakdown: CostBreakdown,
    pub total_cost: Money,
    pub gross_profit: Money,
    pub net_profit: Money,
    pub roi: Percent,
    pub category: RoiCategory,
    pub lift_category: LiftCategory,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

struct PromotedTotals {
    actual: VolumeRevenue,
    cost: Money,
    records: usize,
}

fn promoted_totals(records: &[SalesRecord], promotion: &PromotionWindow) -> PromotedTotals {
    let range = promotion.date_range();
    let scope = promotion.scope();
    let mut totals = PromotedTotals {
        actual: VolumeRevenue::default(),
        cost: Money::ZERO,
        records: 0,
    };
    for r in records
        .iter()
        .filter(|r| range.contains(r.date) && scope.matches(r))
    {
        totals.actual.volume += r.volume;
        totals.actual.revenue += r.revenue;
        totals.cost += r.cost;
        totals.records += 1;
    }
    totals
}

fn assemble(
    window: BaselineWindow,
    estimate: &BaselineEstimate,
    promoted: &PromotedTotals,
    costs: CostBreakdown,
    warnings: &mut Vec<String>,
) -> PerformanceResult {
    let (baseline, baseline_cost) = estimate.projected(promoted.records);
    let uplift = calculate_uplift(baseline, promoted.actual);

    let total_cost = costs.total();
    let incremental_product_cost = promoted.cost - baseline_cost;
    let profit = calculate_profitability(
        uplift.incremental_revenue,
        total_cost,
        incremental_product_cost,
    );

    if estimate.record_count == 0 {
        warnings.push("No baseline sales in window; lift reported as 0".into());
    }
    if promoted.records == 0 {
        warnings.push("No sales recorded during the promotion".into());
    }
    if total_cost.is_zero() {
        warnings.push("Total cost is zero; ROI reported as 0".into());
    }
    warnings.extend(negative_cost_warnings(&costs));

    PerformanceResult {
        baseline_window: window,
        baseline_records: estimate.record_count,
        promoted_records: promoted.records,
        baseline_volume: baseline.volume,
        baseline_revenue: baseline.revenue,
        promoted_volume: promoted.actual.volume,
        promoted_revenue: promoted.actual.revenue,
        incremental_volume: uplift.incremental_volume,
        incremental_revenue: uplift.incremental_revenue,
        volume_lift_pct: uplift.volume_lift_pct,
        revenue_lift_pct: uplift.revenue_lift_pct,
        baseline_was_zero: uplift.baseline_volume_zero && uplift.baseline_revenue_zero,
        cost_breakdown: costs,
        total_cost,
        gross_profit: profit.gross_profit,
        net_profit: profit.net_profit,
        roi: profit.roi,
        category: categorize_roi(profit.roi),
        lift_category: categorize_lift(uplift.volume_lift_pct),
    }
}

fn run_pipeline(
    promotion: &PromotionWindow,
    lookback: Lookback,
    baseline_sales: &[SalesRecord],
    promoted_sales: &[SalesRecord],
    costs: CostBreakdown,
    warnings: &mut Vec<String>,
) -> PromoPerfResult<PerformanceResult> {
    let window = BaselineWindow::before(promotion, lookback)?;
    let estimate = estimate_baseline(baseline_sales, &window, &promotion.scope());
    let promoted = promoted_totals(promoted_sales, promotion);

    tracing::debug!(
        promotion = promotion.promotion_id.as_deref().unwrap_or("-"),
        baseline_records = estimate.record_count,
        promoted_records = promoted.records,
        "performance pipeline inputs selected"
    );

    Ok(assemble(window, &estimate, &promoted, costs, warnings))
}

fn envelope(
    input_lookback: Lookback,
    warnings: Vec<String>,
    start: Instant,
    result: PerformanceResult,
) -> ComputationOutput<PerformanceResult> {
    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Baseline / Uplift / ROI Promotion Performance",
        &serde_json::json!({
            "lookback": input_lookback,
            "baseline_projection": "per-record mean x promoted record count",
            "zero_division_policy": "0",
        }),
        warnings,
        elapsed,
        result,
    )
}

/// Pure pipeline over materialised inputs. Identical inputs give an
/// identical `result`.
pub fn evaluate_performance(
    input: &PerformanceInput,
) -> PromoPerfResult<ComputationOutput<PerformanceResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = run_pipeline(
        &input.promotion,
        input.lookback,
        &input.sales,
        &input.sales,
        input.costs,
        &mut warnings,
    )?;

    Ok(envelope(input.lookback, warnings, start, result))
}

/// Fetch history and costs through `source`, then run the pipeline.
/// Lookup failures from the source are returned unchanged.
pub fn evaluate_promotion<S: SalesSource + ?Sized>(
    source: &S,
    promotion: &PromotionWindow,
    lookback: Lookback,
) -> PromoPerfResult<ComputationOutput<PerformanceResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let promotion_id = promotion
        .promotion_id
        .as_deref()
        .ok_or_else(|| PromoPerfError::InvalidInput {
            field: "promotion.promotion_id".into(),
            reason: "Required to look up promotion costs".into(),
        })?;

    let window = BaselineWindow::before(promotion, lookback)?;
    let baseline_sales = source.fetch_sales_records(&window.filter(&promotion.scope()))?;
    let promoted_sales = source.fetch_sales_records(&promotion.promoted_filter())?;
    let costs = source.fetch_cost_breakdown(promotion_id)?;

    let result = run_pipeline(
        promotion,
        lookback,
        &baseline_sales,
        &promoted_sales,
        costs,
        &mut warnings,
    )?;

    Ok(envelope(lookback, warnings, start, result))
}
