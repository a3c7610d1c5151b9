//! Deterministic offline scenarios used when the service cannot answer.

pub mod baseline;
pub mod synthesizer;

pub use baseline::{baseline, BASELINE_CURRENCY, BASELINE_SCENARIO_NAME};
pub use synthesizer::{apply_currency, scale_money, synthesize, synthesize_at, synthesize_list};
