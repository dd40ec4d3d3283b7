use crate::core::generators::{
    academic_insights, completion_nudge, financial_insights, housing_insights, roommate_insights,
    urgent_insights,
};
use crate::core::needs::analyze_needs;
use crate::core::ranking::{dedupe, prioritize, select};
use crate::core::scoring::CompatibilityWeights;
use crate::models::{
    BudgetRange, Category, DashboardContext, Insight, Priority, Profile, Property,
    RoommateCandidate,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;

// Tuning constants carried over from production. Overridable per-field via
// the `[pipeline]` config section; defaults leave behavior unchanged.
pub const MAX_INSIGHTS: usize = 5;
pub const MATCH_SCORE_FLOOR: u8 = 30;
pub const COMPLETION_ROOMMATE_TRIGGER: u8 = 60;
pub const COMPLETION_NUDGE_FLOOR: u8 = 80;
pub const BUDGET_OVERAGE_MULTIPLIER: f64 = 1.2;
pub const URGENT_ARRIVAL_WINDOW_DAYS: i64 = 30;
pub const UNIVERSITY_BONUS: u8 = 5;
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 3;

/// Pipeline configuration: scoring weights plus the tuning thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub weights: CompatibilityWeights,
    pub max_insights: usize,
    pub match_score_floor: u8,
    pub completion_roommate_trigger: u8,
    pub completion_nudge_floor: u8,
    pub budget_overage_multiplier: f64,
    pub urgent_arrival_window_days: i64,
    pub university_bonus: u8,
    pub generator_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            weights: CompatibilityWeights::default(),
            max_insights: MAX_INSIGHTS,
            match_score_floor: MATCH_SCORE_FLOOR,
            completion_roommate_trigger: COMPLETION_ROOMMATE_TRIGGER,
            completion_nudge_floor: COMPLETION_NUDGE_FLOOR,
            budget_overage_multiplier: BUDGET_OVERAGE_MULTIPLIER,
            urgent_arrival_window_days: URGENT_ARRIVAL_WINDOW_DAYS,
            university_bonus: UNIVERSITY_BONUS,
            generator_timeout_secs: DEFAULT_GENERATOR_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    pub fn generator_timeout(&self) -> Duration {
        Duration::from_secs(self.generator_timeout_secs)
    }
}

/// Failure of a collaborator lookup, as seen by a generator. Timeouts and
/// transport errors are deliberately indistinguishable downstream: both
/// degrade to the category's "unavailable" insight.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("lookup timed out")]
    Timeout,
    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Read-only collaborator seam implemented by the persistence layer
/// (`services::BackendClient` in production, stubs in tests).
pub trait InsightSource {
    /// Budget-filtered available listings, pre-sorted by relevance, at most 5.
    fn find_housing_candidates(
        &self,
        budget: &BudgetRange,
    ) -> impl std::future::Future<Output = Result<Vec<Property>, SourceError>>;

    /// Broad roommate candidate pool excluding the requesting user and
    /// non-production accounts, at most 50.
    fn find_roommate_candidates(
        &self,
        exclude_user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<RoommateCandidate>, SourceError>>;
}

/// Final pipeline output consumed by the dashboard route.
#[derive(Debug, Clone)]
pub struct InsightsOutcome {
    pub insights: Vec<Insight>,
    pub categories: BTreeMap<Category, usize>,
    pub fallback: bool,
}

/// Run the full insight pipeline: need analysis, per-category generation
/// (I/O generators concurrently, each guarded by its own timeout), then
/// dedupe, prioritize and truncate.
///
/// Individual generator failures degrade inside the generator; anything
/// escaping the orchestration itself degrades to the single generic
/// fallback insight with `fallback = true`. This function never errors.
pub async fn generate_insights<S: InsightSource>(
    profile: &Profile,
    context: &DashboardContext,
    source: &S,
    config: &PipelineConfig,
) -> InsightsOutcome {
    // Panic boundary: a programming error anywhere in the orchestration
    // (generators included) must degrade, never unwind into the caller.
    let guarded = AssertUnwindSafe(run_pipeline(profile, context, source, config))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(PipelineError::Internal(panic_message(panic))));

    match guarded {
        Ok(insights) => InsightsOutcome {
            categories: count_categories(&insights),
            insights,
            fallback: false,
        },
        Err(err) => {
            tracing::error!("insight pipeline failed for {}: {}", profile.user_id, err);
            let insights = vec![fallback_insight()];
            InsightsOutcome {
                categories: count_categories(&insights),
                insights,
                fallback: true,
            }
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Orchestration body. Kept fallible so the outer wrapper has a single
/// degradation point; generators themselves never return errors.
async fn run_pipeline<S: InsightSource>(
    profile: &Profile,
    context: &DashboardContext,
    source: &S,
    config: &PipelineConfig,
) -> Result<Vec<Insight>, PipelineError> {
    let needs = analyze_needs(profile, context, config);
    tracing::debug!(
        "needs for {}: housing={} roommate={} financial={} academic={} urgent={}",
        profile.user_id,
        needs.housing,
        needs.roommate,
        needs.financial,
        needs.academic,
        needs.urgent
    );

    let mut candidates: Vec<Insight> = Vec::new();

    // The two I/O generators are independent reads; run them concurrently.
    match (needs.housing, needs.roommate) {
        (true, true) => {
            let (housing, roommate) = tokio::join!(
                housing_insights(profile, source, config),
                roommate_insights(profile, source, config),
            );
            candidates.extend(housing);
            candidates.extend(roommate);
        }
        (true, false) => candidates.extend(housing_insights(profile, source, config).await),
        (false, true) => candidates.extend(roommate_insights(profile, source, config).await),
        (false, false) => {}
    }

    if needs.urgent {
        candidates.extend(urgent_insights(profile, context, config));
    }
    if needs.financial {
        candidates.extend(financial_insights(profile, context));
    }
    if needs.academic {
        candidates.extend(academic_insights(profile));
    }
    if !needs.roommate {
        candidates.extend(completion_nudge(profile, config));
    }

    let deduped = dedupe(candidates);
    let ranked = prioritize(deduped);
    Ok(select(ranked, config.max_insights))
}

/// Error escaping the orchestration boundary. Generators degrade lookup
/// trouble themselves, so this covers programming errors: panics caught at
/// the pipeline's unwind boundary land here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline failure: {0}")]
    Internal(String),
}

/// The single generic insight emitted when the pipeline cannot produce
/// category-specific results.
pub fn fallback_insight() -> Insight {
    Insight::info(
        "welcome-fallback",
        "Welcome to Synapse",
        "Complete your profile to unlock personalized housing and roommate insights.",
        Priority::Low,
        Category::Social,
        "Complete your profile",
    )
}

fn count_categories(insights: &[Insight]) -> BTreeMap<Category, usize> {
    let mut counts = BTreeMap::new();
    for insight in insights {
        *counts.entry(insight.category).or_insert(0) += 1;
    }
    counts
}
