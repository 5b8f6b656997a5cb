pub mod calculators;
pub mod performance;
pub mod scenarios;
