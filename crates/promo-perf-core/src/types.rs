use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::PromoPerfError;
use crate::PromoPerfResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Sales volume in units.
pub type Units = Decimal;

/// Percentages in percentage points (30 = 30%), matching report output.
pub type Percent = Decimal;

/// A single historical sales fact for one product/customer on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product_id: String,
    pub customer_id: String,
    pub volume: Units,
    pub revenue: Money,
    #[serde(default)]
    pub cost: Money,
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> PromoPerfResult<Self> {
        if start > end {
            return Err(PromoPerfError::DateError(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Product and customer scope. An empty set places no restriction on
/// that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub product_ids: BTreeSet<String>,
    #[serde(default)]
    pub customer_ids: BTreeSet<String>,
}

impl Scope {
    pub fn matches(&self, record: &SalesRecord) -> bool {
        (self.product_ids.is_empty() || self.product_ids.contains(&record.product_id))
            && (self.customer_ids.is_empty() || self.customer_ids.contains(&record.customer_id))
    }
}

/// Timing and scope of a scheduled promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub product_ids: BTreeSet<String>,
    #[serde(default)]
    pub customer_ids: BTreeSet<String>,
}

impl PromotionWindow {
    pub fn validate(&self) -> PromoPerfResult<()> {
        if self.start_date > self.end_date {
            return Err(PromoPerfError::InvalidInput {
                field: "promotion.end_date".into(),
                reason: format!(
                    "end date {} precedes start date {}",
                    self.end_date, self.start_date
                ),
            });
        }
        Ok(())
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn scope(&self) -> Scope {
        Scope {
            product_ids: self.product_ids.clone(),
            customer_ids: self.customer_ids.clone(),
        }
    }

    /// Query for the promoted period itself.
    pub fn promoted_filter(&self) -> SalesFilter {
        SalesFilter {
            product_ids: self.product_ids.clone(),
            customer_ids: self.customer_ids.clone(),
            date_range: self.date_range(),
        }
    }
}

/// How far before the promotion start the baseline window reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    Days(u32),
    Weeks(u32),
}

impl Default for Lookback {
    fn default() -> Self {
        Lookback::Days(30)
    }
}

impl Lookback {
    pub fn as_duration(&self) -> Duration {
        match *self {
            Lookback::Days(d) => Duration::days(i64::from(d)),
            Lookback::Weeks(w) => Duration::weeks(i64::from(w)),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Lookback::Days(0) | Lookback::Weeks(0))
    }
}

/// Query handed to the data-access collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesFilter {
    #[serde(default)]
    pub product_ids: BTreeSet<String>,
    #[serde(default)]
    pub customer_ids: BTreeSet<String>,
    pub date_range: DateRange,
}

impl SalesFilter {
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.date_range.contains(record.date)
            && (self.product_ids.is_empty() || self.product_ids.contains(&record.product_id))
            && (self.customer_ids.is_empty() || self.customer_ids.contains(&record.customer_id))
    }
}

/// A volume/revenue pair, used for both baselines and actuals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRevenue {
    pub volume: Units,
    pub revenue: Money,
}

/// Sensitivity variable specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRange {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Percentage change guarded against a zero base: returns 0 rather than
/// an undefined value.
pub fn pct_of(numerator: Decimal, base: Decimal) -> Percent {
    if base.is_zero() {
        Decimal::ZERO
    } else {
        numerator / base * Decimal::ONE_HUNDRED
    }
}
