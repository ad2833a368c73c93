pub mod confidence;
pub mod config;
pub mod evaluator;
pub mod filter;

pub use confidence::{ConfidenceScorer, RandomConfidence};
pub use config::{ConfidenceConfig, FilterConfig, RulesConfig, SignalFileConfig};
pub use evaluator::{candle_time, DirectionRules, SignalEvaluator};
pub use filter::BadSignalFilter;
