// Core pipeline exports
pub mod generators;
pub mod needs;
pub mod pipeline;
pub mod ranking;
pub mod scoring;

pub use needs::{analyze_needs, CategoryNeeds};
pub use pipeline::{
    generate_insights, InsightSource, InsightsOutcome, PipelineConfig, SourceError,
};
pub use ranking::{dedupe, prioritize, select};
pub use scoring::{compatibility_score, synapse_completion, CompatibilityResult, CompatibilityWeights};
