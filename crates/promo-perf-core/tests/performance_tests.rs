use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use promo_perf_core::baseline::{estimate_baseline, BaselineWindow};
use promo_perf_core::categorize::{categorize_lift, categorize_roi, LiftCategory, RoiCategory};
use promo_perf_core::costs::{CostBreakdown, CostCategory};
use promo_perf_core::performance::{evaluate_performance, PerformanceInput};
use promo_perf_core::roi::calculate_profitability;
use promo_perf_core::uplift::calculate_uplift;
use promo_perf_core::{Lookback, PromotionWindow, SalesRecord, VolumeRevenue};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn sale(date: NaiveDate, product: &str, customer: &str, volume: Decimal, revenue: Decimal) -> SalesRecord {
    SalesRecord {
        date,
        product_id: product.into(),
        customer_id: customer.into(),
        volume,
        revenue,
        cost: revenue * dec!(0.6),
    }
}

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn spring_promotion() -> PromotionWindow {
    PromotionWindow {
        promotion_id: Some("PR-2024-SPRING".into()),
        start_date: d(4, 1),
        end_date: d(4, 28),
        product_ids: ids(&["COLA-330"]),
        customer_ids: ids(&["RETAILER-A", "RETAILER-B"]),
    }
}

fn history() -> Vec<SalesRecord> {
    vec![
        // Baseline window (6 weeks before 1 April), in scope
        sale(d(2, 26), "COLA-330", "RETAILER-A", dec!(1000), dec!(5000)),
        sale(d(3, 11), "COLA-330", "RETAILER-B", dec!(1000), dec!(5000)),
        sale(d(3, 25), "COLA-330", "RETAILER-A", dec!(1000), dec!(5000)),
        // Out of scope: other product, other customer
        sale(d(3, 18), "LEMON-330", "RETAILER-A", dec!(9000), dec!(45000)),
        sale(d(3, 18), "COLA-330", "RETAILER-Z", dec!(9000), dec!(45000)),
        // Promoted period, in scope
        sale(d(4, 8), "COLA-330", "RETAILER-A", dec!(1300), dec!(6000)),
        sale(d(4, 22), "COLA-330", "RETAILER-B", dec!(1300), dec!(6000)),
    ]
}

fn spring_costs() -> CostBreakdown {
    CostBreakdown {
        discount_cost: dec!(800),
        marketing_cost: dec!(400),
        cash_coop_cost: dec!(0),
        display_cost: dec!(200),
        logistics_cost: dec!(100),
    }
}

fn spring_input() -> PerformanceInput {
    PerformanceInput {
        promotion: spring_promotion(),
        sales: history(),
        lookback: Lookback::Weeks(6),
        costs: spring_costs(),
    }
}

// ===========================================================================
// Worked examples
// ===========================================================================

#[test]
fn test_lift_thirty_percent() {
    let u = calculate_uplift(
        VolumeRevenue {
            volume: dec!(1000),
            revenue: Decimal::ZERO,
        },
        VolumeRevenue {
            volume: dec!(1300),
            revenue: Decimal::ZERO,
        },
    );
    assert_eq!(u.incremental_volume, dec!(300));
    assert_eq!(u.volume_lift_pct, dec!(30.0));
}

#[test]
fn test_zero_baseline_lift_regardless_of_promoted() {
    for promoted in [dec!(0), dec!(1), dec!(1_000_000)] {
        let u = calculate_uplift(
            VolumeRevenue::default(),
            VolumeRevenue {
                volume: promoted,
                revenue: promoted,
            },
        );
        assert_eq!(u.volume_lift_pct, Decimal::ZERO);
        assert_eq!(u.revenue_lift_pct, Decimal::ZERO);
    }
}

#[test]
fn test_cost_total_example() {
    let c = CostBreakdown {
        discount_cost: dec!(100),
        marketing_cost: dec!(50),
        cash_coop_cost: dec!(0),
        display_cost: dec!(25),
        logistics_cost: dec!(0),
    };
    assert_eq!(c.total(), dec!(175));
}

#[test]
fn test_roi_excellent_example() {
    let p = calculate_profitability(dec!(5000), dec!(1000), Decimal::ZERO);
    assert_eq!(p.gross_profit, dec!(4000));
    assert_eq!(p.roi, dec!(400.0));
    assert_eq!(categorize_roi(p.roi), RoiCategory::Excellent);
}

#[test]
fn test_zero_investment_example() {
    let p = calculate_profitability(dec!(1000), Decimal::ZERO, Decimal::ZERO);
    assert_eq!(p.gross_profit, dec!(1000));
    assert_eq!(p.roi, Decimal::ZERO);
    assert_eq!(categorize_roi(p.roi), RoiCategory::Poor);
}

// ===========================================================================
// Pipeline
// ===========================================================================

#[test]
fn test_spring_promotion_end_to_end() {
    let out = evaluate_performance(&spring_input()).unwrap();
    let r = &out.result;

    assert_eq!(r.baseline_window.start_date, d(2, 19));
    assert_eq!(r.baseline_window.end_date, d(3, 31));
    assert_eq!(r.baseline_window.weeks, 6);
    assert_eq!(r.baseline_records, 3);
    assert_eq!(r.promoted_records, 2);

    // Per-record baseline 1000 units / 5000 revenue over 2 promoted records
    assert_eq!(r.baseline_volume, dec!(2000));
    assert_eq!(r.baseline_revenue, dec!(10000));
    assert_eq!(r.promoted_volume, dec!(2600));
    assert_eq!(r.promoted_revenue, dec!(12000));
    assert_eq!(r.incremental_volume, dec!(600));
    assert_eq!(r.volume_lift_pct, dec!(30));
    assert_eq!(r.revenue_lift_pct, dec!(20));
    assert_eq!(r.lift_category, LiftCategory::High);

    assert_eq!(r.total_cost, dec!(1500));
    assert_eq!(r.gross_profit, dec!(500));
    // 500 / 1500 * 100
    assert!((r.roi - dec!(33.33)).abs() < dec!(0.01));
    assert_eq!(r.category, RoiCategory::Good);

    // COGS: promoted 7200 - projected baseline 6000
    assert_eq!(r.net_profit, dec!(-700));
    assert!(!r.baseline_was_zero);
}

#[test]
fn test_result_is_byte_identical_across_runs() {
    let input = spring_input();
    let first = serde_json::to_vec(&evaluate_performance(&input).unwrap().result).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_vec(&evaluate_performance(&input).unwrap().result).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_zero_baseline_pipeline_is_finite() {
    let mut input = spring_input();
    input.sales.retain(|r| r.date >= d(4, 1));
    let r = evaluate_performance(&input).unwrap().result;
    assert!(r.baseline_was_zero);
    assert_eq!(r.baseline_volume, Decimal::ZERO);
    assert_eq!(r.volume_lift_pct, Decimal::ZERO);
    assert_eq!(r.revenue_lift_pct, Decimal::ZERO);
    assert_eq!(r.lift_category, LiftCategory::Minimal);
}

#[test]
fn test_zero_baseline_and_zero_cost_both_zero() {
    let mut input = spring_input();
    input.sales.retain(|r| r.date >= d(4, 1));
    input.costs = CostBreakdown::default();
    let out = evaluate_performance(&input).unwrap();
    assert_eq!(out.result.volume_lift_pct, Decimal::ZERO);
    assert_eq!(out.result.roi, Decimal::ZERO);
    assert!(out.warnings.len() >= 2);
}

#[test]
fn test_no_promoted_sales() {
    let mut input = spring_input();
    input.sales.retain(|r| r.date < d(4, 1));
    let out = evaluate_performance(&input).unwrap();
    let r = &out.result;
    assert_eq!(r.promoted_records, 0);
    assert_eq!(r.incremental_revenue, Decimal::ZERO);
    assert_eq!(r.gross_profit, dec!(-1500));
    assert_eq!(r.roi, dec!(-100));
    assert_eq!(r.category, RoiCategory::Negative);
}

#[test]
fn test_inverted_promotion_window_errors() {
    let mut input = spring_input();
    input.promotion.end_date = d(3, 1);
    assert!(evaluate_performance(&input).is_err());
}

#[test]
fn test_baseline_window_strictly_precedes_promotion() {
    for lookback in [Lookback::Days(1), Lookback::Days(30), Lookback::Weeks(6), Lookback::Weeks(52)] {
        let w = BaselineWindow::before(&spring_promotion(), lookback).unwrap();
        assert!(w.end_date < spring_promotion().start_date);
        assert!(w.start_date <= w.end_date);
    }
}

#[test]
fn test_baseline_scope_excludes_other_customers() {
    let w = BaselineWindow::before(&spring_promotion(), Lookback::Weeks(6)).unwrap();
    let est = estimate_baseline(&history(), &w, &spring_promotion().scope());
    assert_eq!(est.record_count, 3);
    assert_eq!(est.average_volume, dec!(1000));
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_cost_component_delta_property() {
    let base = spring_costs();
    for cat in CostCategory::ALL {
        for delta in [dec!(-50), dec!(0.01), dec!(12345.67)] {
            let changed = base.with_component(cat, base.component(cat) + delta);
            assert_eq!(changed.total() - base.total(), delta);
        }
    }
}

#[test]
fn test_roi_category_never_inverts() {
    let mut roi = dec!(-60);
    let mut previous = categorize_roi(roi);
    while roi <= dec!(120) {
        let current = categorize_roi(roi);
        assert!(current >= previous, "category dropped at roi {}", roi);
        previous = current;
        roi += dec!(0.5);
    }
}

#[test]
fn test_lift_category_never_inverts() {
    let mut lift = dec!(-20);
    let mut previous = categorize_lift(lift);
    while lift <= dec!(60) {
        let current = categorize_lift(lift);
        assert!(current >= previous, "category dropped at lift {}", lift);
        previous = current;
        lift += dec!(0.25);
    }
}

#[test]
fn test_performance_input_from_json() {
    let json = r#"{
        "promotion": {
            "promotion_id": "PR-9",
            "start_date": "2024-04-01",
            "end_date": "2024-04-07"
        },
        "sales": [
            {"date": "2024-03-20", "product_id": "A", "customer_id": "X", "volume": "100", "revenue": "500"},
            {"date": "2024-04-03", "product_id": "A", "customer_id": "X", "volume": 150, "revenue": 700}
        ],
        "costs": {"marketing_cost": "100"}
    }"#;
    let input: PerformanceInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.lookback, Lookback::Days(30));
    let r = evaluate_performance(&input).unwrap().result;
    assert_eq!(r.incremental_volume, dec!(50));
    assert_eq!(r.volume_lift_pct, dec!(50));
    assert_eq!(r.incremental_revenue, dec!(200));
    assert_eq!(r.roi, dec!(100));
}
