//! Qualitative bands for ROI and lift, as shown on promotion reports.
//!
//! Cut-points are business policy. Comparisons are inclusive and the
//! tables are scanned from the highest threshold down.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ROI band, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoiCategory {
    Negative,
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Lift band, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiftCategory {
    Negative,
    Minimal,
    Low,
    Medium,
    High,
}

const ROI_BANDS: [(Decimal, RoiCategory); 4] = [
    (dec!(50), RoiCategory::Excellent),
    (dec!(25), RoiCategory::Good),
    (dec!(10), RoiCategory::Fair),
    (dec!(0), RoiCategory::Poor),
];

const LIFT_BANDS: [(Decimal, LiftCategory); 4] = [
    (dec!(30), LiftCategory::High),
    (dec!(15), LiftCategory::Medium),
    (dec!(5), LiftCategory::Low),
    (dec!(0), LiftCategory::Minimal),
];

/// First band whose threshold is met, or `fallback` below them all.
fn band<C: Copy>(value: Decimal, bands: &[(Decimal, C)], fallback: C) -> C {
    bands
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, c)| *c)
        .unwrap_or(fallback)
}

pub fn categorize_roi(roi: Decimal) -> RoiCategory {
    band(roi, &ROI_BANDS, RoiCategory::Negative)
}

pub fn categorize_lift(lift_pct: Decimal) -> LiftCategory {
    band(lift_pct, &LIFT_BANDS, LiftCategory::Negative)
}

impl RoiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RoiCategory::Negative => "negative",
            RoiCategory::Poor => "poor",
            RoiCategory::Fair => "fair",
            RoiCategory::Good => "good",
            RoiCategory::Excellent => "excellent",
        }
    }
}

impl LiftCategory {
    pub fn label(&self) -> &'static str {
        match self {
            LiftCategory::Negative => "negative",
            LiftCategory::Minimal => "minimal",
            LiftCategory::Low => "low",
            LiftCategory::Medium => "medium",
            LiftCategory::High => "high",
        }
    }
}

impl fmt::Display for RoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for LiftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Both labels for a pair of scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi_category: Option<RoiCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lift_category: Option<LiftCategory>,
}

pub fn categorize(roi: Option<Decimal>, lift_pct: Option<Decimal>) -> CategoryOutput {
    CategoryOutput {
        roi_category: roi.map(categorize_roi),
        lift_category: lift_pct.map(categorize_lift),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_cut_points_inclusive() {
        assert_eq!(categorize_roi(dec!(50)), RoiCategory::Excellent);
        assert_eq!(categorize_roi(dec!(49.99)), RoiCategory::Good);
        assert_eq!(categorize_roi(dec!(25)), RoiCategory::Good);
        assert_eq!(categorize_roi(dec!(10)), RoiCategory::Fair);
        assert_eq!(categorize_roi(dec!(9.999)), RoiCategory::Poor);
        assert_eq!(categorize_roi(dec!(0)), RoiCategory::Poor);
        assert_eq!(categorize_roi(dec!(-0.01)), RoiCategory::Negative);
        assert_eq!(categorize_roi(dec!(400)), RoiCategory::Excellent);
    }

    #[test]
    fn test_lift_cut_points_inclusive() {
        assert_eq!(categorize_lift(dec!(30)), LiftCategory::High);
        assert_eq!(categorize_lift(dec!(29.9)), LiftCategory::Medium);
        assert_eq!(categorize_lift(dec!(15)), LiftCategory::Medium);
        assert_eq!(categorize_lift(dec!(5)), LiftCategory::Low);
        assert_eq!(categorize_lift(dec!(4.99)), LiftCategory::Minimal);
        assert_eq!(categorize_lift(dec!(0)), LiftCategory::Minimal);
        assert_eq!(categorize_lift(dec!(-1)), LiftCategory::Negative);
    }

    #[test]
    fn test_roi_category_monotonic() {
        let samples = [
            dec!(-100),
            dec!(-0.5),
            dec!(0),
            dec!(3),
            dec!(10),
            dec!(24.9),
            dec!(25),
            dec!(49),
            dec!(50),
            dec!(1000),
        ];
        for pair in samples.windows(2) {
            assert!(categorize_roi(pair[0]) <= categorize_roi(pair[1]));
        }
    }

    #[test]
    fn test_labels_serialize_lowercase() {
        let json = serde_json::to_string(&RoiCategory::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
        assert_eq!(LiftCategory::Medium.to_string(), "medium");
    }
}
