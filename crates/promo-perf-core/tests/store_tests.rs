use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use promo_perf_core::costs::CostBreakdown;
use promo_perf_core::memo::{evaluate_performance_cached, PerformanceCache};
use promo_perf_core::performance::{evaluate_performance, evaluate_promotion, PerformanceInput};
use promo_perf_core::store::{InMemorySalesStore, SalesSource};
use promo_perf_core::{
    Lookback, PromoPerfError, PromoPerfResult, PromotionWindow, SalesFilter, SalesRecord,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::time::Duration;

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn sale(date: NaiveDate, customer: &str, volume: Decimal, revenue: Decimal) -> SalesRecord {
    SalesRecord {
        date,
        product_id: "JUICE-1L".into(),
        customer_id: customer.into(),
        volume,
        revenue,
        cost: revenue / dec!(2),
    }
}

fn promotion() -> PromotionWindow {
    PromotionWindow {
        promotion_id: Some("PR-JUNE".into()),
        start_date: d(6, 1),
        end_date: d(6, 14),
        product_ids: ["JUICE-1L".to_string()].into_iter().collect(),
        customer_ids: BTreeSet::new(),
    }
}

fn costs() -> CostBreakdown {
    CostBreakdown {
        discount_cost: dec!(300),
        display_cost: dec!(100),
        ..CostBreakdown::default()
    }
}

fn sales() -> Vec<SalesRecord> {
    vec![
        sale(d(5, 10), "SHOP-1", dec!(200), dec!(1000)),
        sale(d(5, 24), "SHOP-2", dec!(200), dec!(1000)),
        sale(d(6, 3), "SHOP-1", dec!(260), dec!(1200)),
        sale(d(6, 10), "SHOP-2", dec!(260), dec!(1200)),
        // after the promotion ends
        sale(d(6, 20), "SHOP-1", dec!(999), dec!(9999)),
    ]
}

fn store() -> InMemorySalesStore {
    InMemorySalesStore::new(sales()).with_costs("PR-JUNE", costs())
}

// ===========================================================================
// Fetching through a source
// ===========================================================================

#[test]
fn test_source_and_materialised_inputs_agree() {
    let fetched = evaluate_promotion(&store(), &promotion(), Lookback::Days(30)).unwrap();
    let direct = evaluate_performance(&PerformanceInput {
        promotion: promotion(),
        sales: sales(),
        lookback: Lookback::Days(30),
        costs: costs(),
    })
    .unwrap();
    assert_eq!(fetched.result, direct.result);

    let r = &fetched.result;
    assert_eq!(r.baseline_records, 2);
    assert_eq!(r.promoted_records, 2);
    assert_eq!(r.incremental_revenue, dec!(400));
    assert_eq!(r.total_cost, dec!(400));
    assert_eq!(r.roi, Decimal::ZERO);
}

#[test]
fn test_store_loads_from_json() {
    let json = r#"{
        "sales": [
            {"date": "2024-05-10", "product_id": "JUICE-1L", "customer_id": "SHOP-1", "volume": "200", "revenue": "1000"},
            {"date": "2024-06-03", "product_id": "JUICE-1L", "customer_id": "SHOP-1", "volume": "300", "revenue": "1400"}
        ],
        "costs": {"PR-JUNE": {"marketing_cost": "200"}}
    }"#;
    let store: InMemorySalesStore = serde_json::from_str(json).unwrap();
    let out = evaluate_promotion(&store, &promotion(), Lookback::Weeks(4)).unwrap();
    assert_eq!(out.result.incremental_volume, dec!(100));
    assert_eq!(out.result.gross_profit, dec!(200));
    assert_eq!(out.result.roi, dec!(100));
}

#[test]
fn test_missing_costs_are_not_found() {
    let store = InMemorySalesStore::new(sales());
    match evaluate_promotion(&store, &promotion(), Lookback::Days(30)) {
        Err(PromoPerfError::NotFound { entity, id }) => {
            assert_eq!(entity, "promotion");
            assert_eq!(id, "PR-JUNE");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_promotion_without_id_rejected() {
    let mut promo = promotion();
    promo.promotion_id = None;
    assert!(matches!(
        evaluate_promotion(&store(), &promo, Lookback::Days(30)),
        Err(PromoPerfError::InvalidInput { .. })
    ));
}

/// Fails every sales lookup after the first `allowed` calls.
struct FlakyWarehouse {
    inner: InMemorySalesStore,
    allowed: usize,
    calls: Cell<usize>,
}

impl SalesSource for FlakyWarehouse {
    fn fetch_sales_records(&self, filter: &SalesFilter) -> PromoPerfResult<Vec<SalesRecord>> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n >= self.allowed {
            return Err(PromoPerfError::Upstream("warehouse connection reset".into()));
        }
        self.inner.fetch_sales_records(filter)
    }

    fn fetch_cost_breakdown(&self, promotion_id: &str) -> PromoPerfResult<CostBreakdown> {
        self.inner.fetch_cost_breakdown(promotion_id)
    }
}

#[test]
fn test_upstream_failure_propagates_unchanged() {
    for allowed in [0, 1] {
        let source = FlakyWarehouse {
            inner: store(),
            allowed,
            calls: Cell::new(0),
        };
        match evaluate_promotion(&source, &promotion(), Lookback::Days(30)) {
            Err(PromoPerfError::Upstream(msg)) => {
                assert_eq!(msg, "warehouse connection reset");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
        // no retry after the failing call
        assert_eq!(source.calls.get(), allowed + 1);
    }
}

#[test]
fn test_source_usable_as_trait_object() {
    let source: Box<dyn SalesSource> = Box::new(store());
    let out = evaluate_promotion(source.as_ref(), &promotion(), Lookback::Days(30)).unwrap();
    assert_eq!(out.result.promoted_records, 2);
}

// ===========================================================================
// Memoised evaluation
// ===========================================================================

#[test]
fn test_cached_result_matches_uncached() {
    let input = PerformanceInput {
        promotion: promotion(),
        sales: sales(),
        lookback: Lookback::Days(30),
        costs: costs(),
    };
    let mut cache = PerformanceCache::new(Duration::from_secs(300), 4);
    let first = evaluate_performance_cached(&mut cache, &input).unwrap();
    let second = evaluate_performance_cached(&mut cache, &input).unwrap();
    let uncached = evaluate_performance(&input).unwrap();

    assert_eq!(first.result, uncached.result);
    assert_eq!(second.result, uncached.result);
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn test_changed_input_misses_cache() {
    let mut input = PerformanceInput {
        promotion: promotion(),
        sales: sales(),
        lookback: Lookback::Days(30),
        costs: costs(),
    };
    let mut cache = PerformanceCache::default();
    let before = evaluate_performance_cached(&mut cache, &input).unwrap();
    input.costs.marketing_cost = dec!(400);
    let after = evaluate_performance_cached(&mut cache, &input).unwrap();

    assert_eq!(cache.stats().misses, 2);
    assert_eq!(before.result.total_cost, dec!(400));
    assert_eq!(after.result.total_cost, dec!(800));
}

#[test]
fn test_cache_does_not_store_errors() {
    let mut input = PerformanceInput {
        promotion: promotion(),
        sales: sales(),
        lookback: Lookback::Days(30),
        costs: costs(),
    };
    input.promotion.end_date = d(5, 1);
    let mut cache = PerformanceCache::default();
    assert!(evaluate_performance_cached(&mut cache, &input).is_err());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_hit_keeps_warnings_and_methodology() {
    let input = PerformanceInput {
        promotion: promotion(),
        sales: Vec::new(),
        lookback: Lookback::Days(30),
        costs: CostBreakdown::default(),
    };
    let mut cache = PerformanceCache::default();
    let miss = evaluate_performance_cached(&mut cache, &input).unwrap();
    let hit = evaluate_performance_cached(&mut cache, &input).unwrap();
    assert_eq!(cache.stats().hits, 1);

    assert!(miss
        .warnings
        .iter()
        .any(|w| w == "Total cost is zero; ROI reported as 0"));
    assert!(miss
        .warnings
        .iter()
        .any(|w| w == "No baseline sales in window; lift reported as 0"));
    assert_eq!(hit.warnings, miss.warnings);
    assert_eq!(hit.methodology, miss.methodology);
    assert_eq!(hit.assumptions, miss.assumptions);
    assert_eq!(hit.result, miss.result);
}
