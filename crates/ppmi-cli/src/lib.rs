//! CLI library components for the cohort derivation pipeline.

pub mod logging;
