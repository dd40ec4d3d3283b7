//! Synapse Insights - insight generation service for the Synapse
//! student-housing platform
//!
//! This library implements the dashboard insight pipeline: category need
//! analysis, per-category insight generation (including pairwise roommate
//! compatibility scoring), deduplication, prioritization and truncation,
//! with graceful degradation at every stage.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    compatibility_score, generate_insights, synapse_completion, CompatibilityWeights,
    InsightSource, InsightsOutcome, PipelineConfig,
};
pub use crate::models::{
    Category, DashboardContext, Insight, InsightBody, InsightsResponse, Priority, Profile,
    Property, RoommateCandidate, SynapsePreferences,
};
