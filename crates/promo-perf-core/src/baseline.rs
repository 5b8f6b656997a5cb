use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PromoPerfError;
use crate::types::*;
use crate::PromoPerfResult;

/// Trailing window of history used as the pre-promotion reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weeks: u32,
}

impl BaselineWindow {
    /// Derive the baseline window ending the day before the promotion
    /// starts, so the baseline never overlaps the promoted period.
    pub fn before(promotion: &PromotionWindow, lookback: Lookback) -> PromoPerfResult<Self> {
        promotion.validate()?;
        if lookback.is_empty() {
            return Err(PromoPerfError::InvalidInput {
                field: "lookback".into(),
                reason: "Lookback must cover at least one day".into(),
            });
        }

        let end_date = promotion
            .start_date
            .checked_sub_signed(Duration::days(1))
            .ok_or_else(|| {
                PromoPerfError::DateError(format!(
                    "cannot step back from {}",
                    promotion.start_date
                ))
            })?;
        let start_date = promotion
            .start_date
            .checked_sub_signed(lookback.as_duration())
            .ok_or_else(|| {
                PromoPerfError::DateError(format!(
                    "lookback underflows calendar from {}",
                    promotion.start_date
                ))
            })?;

        let days = (end_date - start_date).num_days() + 1;
        let weeks = ((days + 6) / 7) as u32;

        Ok(Self {
            start_date,
            end_date,
            weeks,
        })
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Query for the baseline period with the promotion's scope.
    pub fn filter(&self, scope: &Scope) -> SalesFilter {
        SalesFilter {
            product_ids: scope.product_ids.clone(),
            customer_ids: scope.customer_ids.clone(),
            date_range: self.date_range(),
        }
    }
}

/// Per-record averages over the baseline window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineEstimate {
    pub average_volume: Units,
    pub average_revenue: Money,
    pub average_cost: Money,
    pub record_count: usize,
}

impl BaselineEstimate {
    pub fn averages(&self) -> VolumeRevenue {
        VolumeRevenue {
            volume: self.average_volume,
            revenue: self.average_revenue,
        }
    }

    /// Expected totals had `periods` promoted records sold at baseline.
    pub fn projected(&self, periods: usize) -> (VolumeRevenue, Money) {
        let n = Decimal::from(periods);
        (
            VolumeRevenue {
                volume: self.average_volume * n,
                revenue: self.average_revenue * n,
            },
            self.average_cost * n,
        )
    }
}

/// Input for a standalone baseline estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineInput {
    pub promotion: PromotionWindow,
    #[serde(default)]
    pub lookback: Lookback,
    pub sales: Vec<SalesRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineOutput {
    pub window: BaselineWindow,
    pub estimate: BaselineEstimate,
}

/// Arithmetic means of volume, revenue and cost across records that fall
/// inside the window and match the scope. Zero matches yields zero means.
pub fn estimate_baseline(
    records: &[SalesRecord],
    window: &BaselineWindow,
    scope: &Scope,
) -> BaselineEstimate {
    let range = window.date_range();
    let mut volume = Decimal::ZERO;
    let mut revenue = Decimal::ZERO;
    let mut cost = Decimal::ZERO;
    let mut count = 0usize;

    for r in records
        .iter()
        .filter(|r| range.contains(r.date) && scope.matches(r))
    {
        volume += r.volume;
        revenue += r.revenue;
        cost += r.cost;
        count += 1;
    }

    if count == 0 {
        return BaselineEstimate::default();
    }

    let n = Decimal::from(count);
    BaselineEstimate {
        average_volume: volume / n,
        average_revenue: revenue / n,
        average_cost: cost / n,
        record_count: count,
    }
}

/// Derive the baseline window for a promotion and estimate it.
pub fn calculate_baseline(
    input: &BaselineInput,
) -> PromoPerfResult<ComputationOutput<BaselineOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let window = BaselineWindow::before(&input.promotion, input.lookback)?;
    let estimate = estimate_baseline(&input.sales, &window, &input.promotion.scope());

    if estimate.record_count == 0 {
        warnings.push(format!(
            "No sales records between {} and {}; baseline is zero",
            window.start_date, window.end_date
        ));
    }
    tracing::debug!(
        start = %window.start_date,
        end = %window.end_date,
        records = estimate.record_count,
        "baseline estimated"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Trailing-Window Mean Baseline",
        &serde_json::json!({
            "lookback": input.lookback,
            "weeks": window.weeks,
        }),
        warnings,
        elapsed,
        BaselineOutput { window, estimate },
    ))
}
