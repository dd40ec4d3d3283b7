// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub(crate) use domain::non_empty;
pub use domain::{
    AcademicStage, BudgetRange, Category, CulturePrefs, DashboardContext, FocusArea, GroupItem,
    GroupKind, HabitsPrefs, HomeRegion, Insight, InsightBody, InsightGroup, LifestylePrefs,
    LogisticsPrefs, Onboarding, PetsPrefs, Priority, Profile, Property, RoommateCandidate,
    SynapsePreferences,
};
pub use requests::GenerateInsightsRequest;
pub use responses::{ErrorResponse, HealthResponse, InsightsResponse};
