use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;
use crate::PromoPerfResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for an uplift calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpliftInput {
    pub baseline: VolumeRevenue,
    pub actual: VolumeRevenue,
}

/// Promoted-period actuals compared against baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uplift {
    /// actual - baseline volume
    pub incremental_volume: Units,
    /// actual - baseline revenue
    pub incremental_revenue: Money,
    /// 0 when baseline volume is zero
    pub volume_lift_pct: Percent,
    /// 0 when baseline revenue is zero
    pub revenue_lift_pct: Percent,
    pub baseline_volume_zero: bool,
    pub baseline_revenue_zero: bool,
}

/// Split of incremental revenue into volume and price effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftDecomposition {
    pub baseline_unit_price: Money,
    pub actual_unit_price: Money,
    /// (actual volume - baseline volume) * baseline unit price
    pub volume_effect: Money,
    /// (actual unit price - baseline unit price) * actual volume
    pub price_effect: Money,
    /// Residual: incremental revenue - volume effect - price effect
    pub residual: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpliftOutput {
    pub uplift: Uplift,
    pub decomposition: LiftDecomposition,
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

pub fn calculate_uplift(baseline: VolumeRevenue, actual: VolumeRevenue) -> Uplift {
    let incremental_volume = actual.volume - baseline.volume;
    let incremental_revenue = actual.revenue - baseline.revenue;

    Uplift {
        incremental_volume,
        incremental_revenue,
        volume_lift_pct: pct_of(incremental_volume, baseline.volume),
        revenue_lift_pct: pct_of(incremental_revenue, baseline.revenue),
        baseline_volume_zero: baseline.volume.is_zero(),
        baseline_revenue_zero: baseline.revenue.is_zero(),
    }
}

fn unit_price(vr: VolumeRevenue) -> Money {
    if vr.volume.is_zero() {
        Decimal::ZERO
    } else {
        vr.revenue / vr.volume
    }
}

pub fn decompose_revenue_lift(baseline: VolumeRevenue, actual: VolumeRevenue) -> LiftDecomposition {
    let baseline_unit_price = unit_price(baseline);
    let actual_unit_price = unit_price(actual);

    let volume_effect = (actual.volume - baseline.volume) * baseline_unit_price;
    let price_effect = (actual_unit_price - baseline_unit_price) * actual.volume;
    let residual = (actual.revenue - baseline.revenue) - volume_effect - price_effect;

    LiftDecomposition {
        baseline_unit_price,
        actual_unit_price,
        volume_effect,
        price_effect,
        residual,
    }
}

/// Uplift plus decomposition, wrapped in the standard envelope.
pub fn analyze_uplift(input: &UpliftInput) -> PromoPerfResult<ComputationOutput<UpliftOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let uplift = calculate_uplift(input.baseline, input.actual);
    if uplift.baseline_volume_zero {
        warnings.push("Baseline volume is zero; volume lift reported as 0".into());
    }
    if uplift.baseline_revenue_zero {
        warnings.push("Baseline revenue is zero; revenue lift reported as 0".into());
    }
    let decomposition = decompose_revenue_lift(input.baseline, input.actual);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Incremental Uplift vs Baseline",
        &serde_json::json!({ "zero_baseline_policy": "lift = 0" }),
        warnings,
        elapsed,
        UpliftOutput {
            uplift,
            decomposition,
        },
    ))
}
