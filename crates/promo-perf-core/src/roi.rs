use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;
use crate::PromoPerfResult;

/// Input for profitability of a promotion's incremental business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityInput {
    pub incremental_revenue: Money,
    pub total_cost: Money,
    /// Change in cost of goods between baseline and promoted periods
    #[serde(default)]
    pub incremental_product_cost: Money,
    /// Baseline revenue, for the break-even lift
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_revenue: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profitability {
    /// incremental revenue - total cost
    pub gross_profit: Money,
    /// gross profit - incremental product cost
    pub net_profit: Money,
    /// gross profit / total cost * 100; 0 for zero investment
    pub roi: Percent,
    /// net profit / total cost * 100; 0 for zero investment
    pub net_roi: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityOutput {
    pub profitability: Profitability,
    pub breakeven_lift_pct: Option<Percent>,
}

pub fn calculate_profitability(
    incremental_revenue: Money,
    total_cost: Money,
    incremental_product_cost: Money,
) -> Profitability {
    let gross_profit = incremental_revenue - total_cost;
    let net_profit = gross_profit - incremental_product_cost;

    Profitability {
        gross_profit,
        net_profit,
        roi: pct_of(gross_profit, total_cost),
        net_roi: pct_of(net_profit, total_cost),
    }
}

/// Revenue lift over baseline at which incremental revenue just covers
/// the investment.
pub fn breakeven_lift_pct(total_cost: Money, baseline_revenue: Money) -> Percent {
    pct_of(total_cost, baseline_revenue)
}

pub fn analyze_profitability(
    input: &ProfitabilityInput,
) -> PromoPerfResult<ComputationOutput<ProfitabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let profitability = calculate_profitability(
        input.incremental_revenue,
        input.total_cost,
        input.incremental_product_cost,
    );
    if input.total_cost.is_zero() {
        tracing::warn!("zero investment; ROI reported as 0");
        warnings.push("Total cost is zero; ROI reported as 0".into());
    }

    let breakeven = input.baseline_revenue.map(|base| {
        if base.is_zero() {
            warnings.push("Baseline revenue is zero; break-even lift reported as 0".into());
        }
        breakeven_lift_pct(input.total_cost, base)
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Promotion ROI (gross profit over investment)",
        &serde_json::json!({
            "zero_investment_policy": "roi = 0",
            "incremental_product_cost": input.incremental_product_cost.to_string(),
        }),
        warnings,
        elapsed,
        ProfitabilityOutput {
            profitability,
            breakeven_lift_pct: breakeven,
        },
    ))
}
