use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;
use crate::PromoPerfResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Trade-spend cost categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Discount,
    Marketing,
    CashCoop,
    Display,
    Logistics,
}

impl CostCategory {
    pub const ALL: [CostCategory; 5] = [
        CostCategory::Discount,
        CostCategory::Marketing,
        CostCategory::CashCoop,
        CostCategory::Display,
        CostCategory::Logistics,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CostCategory::Discount => "discount",
            CostCategory::Marketing => "marketing",
            CostCategory::CashCoop => "cash_coop",
            CostCategory::Display => "display",
            CostCategory::Logistics => "logistics",
        }
    }
}

/// Promotion investment by component. Missing fields deserialize as 0.
/// The total is computed, never stored; see [`CostBreakdown::total`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostBreakdown {
    pub discount_cost: Money,
    pub marketing_cost: Money,
    pub cash_coop_cost: Money,
    pub display_cost: Money,
    pub logistics_cost: Money,
}

/// Whether spend lines are aggregated on plan or on actuals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    #[default]
    Planned,
    Actual,
}

/// A single trade-spend entry against a promotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSpendLine {
    pub category: CostCategory,
    #[serde(default)]
    pub planned: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Money>,
}

/// Input for cost aggregation: either a ready breakdown, spend lines,
/// or both (lines are added on top of the breakdown).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostInput {
    #[serde(default)]
    pub breakdown: CostBreakdown,
    #[serde(default)]
    pub spend_lines: Vec<TradeSpendLine>,
    #[serde(default)]
    pub basis: CostBasis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostOutput {
    pub breakdown: CostBreakdown,
    pub total_cost: Money,
}

// ---------------------------------------------------------------------------
// Breakdown
// ---------------------------------------------------------------------------

impl CostBreakdown {
    pub fn total(&self) -> Money {
        self.discount_cost
            + self.marketing_cost
            + self.cash_coop_cost
            + self.display_cost
            + self.logistics_cost
    }

    pub fn component(&self, category: CostCategory) -> Money {
        match category {
            CostCategory::Discount => self.discount_cost,
            CostCategory::Marketing => self.marketing_cost,
            CostCategory::CashCoop => self.cash_coop_cost,
            CostCategory::Display => self.display_cost,
            CostCategory::Logistics => self.logistics_cost,
        }
    }

    fn component_mut(&mut self, category: CostCategory) -> &mut Money {
        match category {
            CostCategory::Discount => &mut self.discount_cost,
            CostCategory::Marketing => &mut self.marketing_cost,
            CostCategory::CashCoop => &mut self.cash_coop_cost,
            CostCategory::Display => &mut self.display_cost,
            CostCategory::Logistics => &mut self.logistics_cost,
        }
    }

    /// Copy with one component replaced.
    pub fn with_component(mut self, category: CostCategory, amount: Money) -> Self {
        *self.component_mut(category) = amount;
        self
    }

    /// Accumulate spend lines. On an actual basis a line without an
    /// actual amount falls back to its planned amount.
    pub fn from_spend_lines(lines: &[TradeSpendLine], basis: CostBasis) -> Self {
        let mut out = CostBreakdown::default();
        out.add_spend_lines(lines, basis);
        out
    }

    fn add_spend_lines(&mut self, lines: &[TradeSpendLine], basis: CostBasis) {
        for line in lines {
            let amount = match basis {
                CostBasis::Planned => line.planned,
                CostBasis::Actual => line.actual.unwrap_or(line.planned),
            };
            *self.component_mut(line.category) += amount;
        }
    }

    /// Components below zero. They are summed as given, not rejected.
    pub fn negative_components(&self) -> Vec<CostCategory> {
        CostCategory::ALL
            .into_iter()
            .filter(|c| self.component(*c) < Decimal::ZERO)
            .collect()
    }
}

/// Warnings for negative components, also emitted as tracing events.
pub(crate) fn negative_cost_warnings(breakdown: &CostBreakdown) -> Vec<String> {
    breakdown
        .negative_components()
        .into_iter()
        .map(|c| {
            let amount = breakdown.component(c);
            tracing::warn!(component = c.label(), %amount, "negative cost component");
            format!("Cost component '{}' is negative ({amount})", c.label())
        })
        .collect()
}

/// Aggregate a breakdown and optional spend lines into a total investment.
pub fn aggregate_costs(input: &CostInput) -> PromoPerfResult<ComputationOutput<CostOutput>> {
    let start = Instant::now();

    let mut breakdown = input.breakdown;
    breakdown.add_spend_lines(&input.spend_lines, input.basis);
    let warnings = negative_cost_warnings(&breakdown);

    let output = CostOutput {
        total_cost: breakdown.total(),
        breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Trade Spend Cost Aggregation",
        &serde_json::json!({
            "basis": input.basis,
            "spend_lines": input.spend_lines.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
