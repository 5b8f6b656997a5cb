use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PromoPerfError;
use crate::types::Lookback;
use crate::PromoPerfResult;

/// Placeholder risk score assigned to every scenario unless overridden.
/// It has no statistical derivation.
pub const DEFAULT_RISK_SCORE: Decimal = dec!(5.5);

/// Placeholder confidence attached to the recommended scenario.
pub const DEFAULT_RECOMMENDATION_CONFIDENCE: Decimal = dec!(0.85);

/// Volume lift percentage points per discount percentage point.
pub const DEFAULT_ELASTICITY: Decimal = dec!(1.5);

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Engine-wide tunables. Every field has a default so partial files load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lookback: Lookback,
    pub scenario: ScenarioConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub elasticity: Decimal,
    pub risk_score: Decimal,
    pub recommendation_confidence: Decimal,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            elasticity: DEFAULT_ELASTICITY,
            risk_score: DEFAULT_RISK_SCORE,
            recommendation_confidence: DEFAULT_RECOMMENDATION_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> PromoPerfResult<()> {
        if self.lookback.is_empty() {
            return Err(PromoPerfError::InvalidInput {
                field: "lookback".into(),
                reason: "Lookback must cover at least one day".into(),
            });
        }
        let conf = self.scenario.recommendation_confidence;
        if conf < Decimal::ZERO || conf > Decimal::ONE {
            return Err(PromoPerfError::InvalidInput {
                field: "scenario.recommendation_confidence".into(),
                reason: format!("Confidence must be between 0 and 1 (got {conf})"),
            });
        }
        if self.cache.capacity == 0 {
            return Err(PromoPerfError::InvalidInput {
                field: "cache.capacity".into(),
                reason: "Capacity must be positive".into(),
            });
        }
        Ok(())
    }

    /// Insert the configured lookback into a raw input object that has
    /// no `lookback` key. Non-object values pass through untouched.
    pub fn with_default_lookback(
        &self,
        mut value: serde_json::Value,
    ) -> PromoPerfResult<serde_json::Value> {
        if let Some(map) = value.as_object_mut() {
            if !map.contains_key("lookback") {
                map.insert("lookback".into(), serde_json::to_value(self.lookback)?);
            }
        }
        Ok(value)
    }
}
