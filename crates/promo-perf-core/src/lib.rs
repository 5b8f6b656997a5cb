pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "baseline")]
pub mod baseline;

#[cfg(feature = "uplift")]
pub mod uplift;

#[cfg(feature = "costs")]
pub mod costs;

#[cfg(feature = "roi")]
pub mod roi;

#[cfg(feature = "categorize")]
pub mod categorize;

#[cfg(feature = "performance")]
pub mod performance;

#[cfg(feature = "performance")]
pub mod store;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "memo")]
pub mod memo;

pub use error::PromoPerfError;
pub use types::*;

/// Standard result type for all promotion calculations
pub type PromoPerfResult<T> = Result<T, PromoPerfError>;
