//! Cross-module physics tests: brute-force reference comparisons and
//! whole-pool scenarios

mod reference_properties;
mod pool_scenarios;
