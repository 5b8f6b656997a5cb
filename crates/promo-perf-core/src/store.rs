use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::costs::CostBreakdown;
use crate::error::PromoPerfError;
use crate::types::{SalesFilter, SalesRecord};
use crate::PromoPerfResult;

/// Read-only access to sales history and promotion costs.
///
/// Implementations map their own lookup failures onto
/// [`PromoPerfError::NotFound`] or [`PromoPerfError::Upstream`]; callers
/// in this crate pass those through without retrying.
pub trait SalesSource {
    fn fetch_sales_records(&self, filter: &SalesFilter) -> PromoPerfResult<Vec<SalesRecord>>;

    fn fetch_cost_breakdown(&self, promotion_id: &str) -> PromoPerfResult<CostBreakdown>;
}

/// A dataset held in memory, loadable from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySalesStore {
    #[serde(default)]
    pub sales: Vec<SalesRecord>,
    #[serde(default)]
    pub costs: BTreeMap<String, CostBreakdown>,
}

impl InMemorySalesStore {
    pub fn new(sales: Vec<SalesRecord>) -> Self {
        Self {
            sales,
            costs: BTreeMap::new(),
        }
    }

    pub fn with_costs(mut self, promotion_id: impl Into<String>, costs: CostBreakdown) -> Self {
        self.costs.insert(promotion_id.into(), costs);
        self
    }
}

impl SalesSource for InMemorySalesStore {
    fn fetch_sales_records(&self, filter: &SalesFilter) -> PromoPerfResult<Vec<SalesRecord>> {
        Ok(self
            .sales
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn fetch_cost_breakdown(&self, promotion_id: &str) -> PromoPerfResult<CostBreakdown> {
        self.costs
            .get(promotion_id)
            .copied()
            .ok_or_else(|| PromoPerfError::NotFound {
                entity: "promotion".into(),
                id: promotion_id.into(),
            })
    }
}
