use crate::core::pipeline::PipelineConfig;
use crate::core::scoring::synapse_completion;
use crate::models::{non_empty, DashboardContext, FocusArea, Profile};

/// Which insight categories are worth generating for this profile. Rules
/// are independent; a profile may trigger several at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryNeeds {
    pub housing: bool,
    pub roommate: bool,
    pub financial: bool,
    pub academic: bool,
    pub urgent: bool,
}

/// Inspect a profile and the ambient dashboard context and flag the
/// categories that apply. Pure; malformed or missing fields read as absent.
pub fn analyze_needs(
    profile: &Profile,
    context: &DashboardContext,
    config: &PipelineConfig,
) -> CategoryNeeds {
    let urgent = profile
        .days_until_arrival(context.today)
        .is_some_and(|days| (0..=config.urgent_arrival_window_days).contains(&days));

    let has_housing_needs = profile
        .onboarding
        .housing_needs
        .iter()
        .any(|need| non_empty(Some(need)).is_some());

    let housing = profile.onboarding.focus.contains(&FocusArea::Housing)
        || has_housing_needs
        || profile.onboarding.budget.is_some()
        || profile.preferences.budget_max().is_some()
        || urgent;

    let completion = synapse_completion(&profile.preferences);
    let has_key_signal = profile.preferences.primary_language().is_some()
        || profile.preferences.sleep_pattern().is_some()
        || profile.preferences.cleanliness().is_some();

    let roommate = profile.onboarding.focus.contains(&FocusArea::Roommate)
        || completion >= config.completion_roommate_trigger
        || has_key_signal;

    let financial = match (profile.budget_cap(), context.average_property_price) {
        (Some(cap), Some(average)) => average > config.budget_overage_multiplier * cap,
        _ => false,
    };

    let academic = non_empty(profile.onboarding.major.as_deref()).is_some()
        && !profile.onboarding.has_academic_plan
        && !profile
            .onboarding
            .academic_level
            .is_some_and(|level| level.is_past_study());

    CategoryNeeds {
        housing,
        roommate,
        financial,
        academic,
        urgent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetRange, CulturePrefs, SynapsePreferences};
    use chrono::NaiveDate;

    fn context(today: &str, average: Option<f64>) -> DashboardContext {
        DashboardContext {
            average_property_price: average,
            property_count: 120,
            marketplace_count: 30,
            today: NaiveDate::parse_from_str(today, "%Y-%m-%d").unwrap(),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn empty_profile_triggers_nothing() {
        let needs = analyze_needs(
            &Profile::default(),
            &context("2026-08-30", Some(700.0)),
            &config(),
        );
        assert_eq!(needs, CategoryNeeds::default());
    }

    #[test]
    fn arrival_within_window_is_urgent_and_housing() {
        let mut profile = Profile::default();
        profile.onboarding.arrival_date =
            NaiveDate::parse_from_str("2026-09-10", "%Y-%m-%d").ok();
        let needs = analyze_needs(&profile, &context("2026-08-30", None), &config());
        assert!(needs.urgent);
        assert!(needs.housing);
    }

    #[test]
    fn past_arrival_is_not_urgent() {
        let mut profile = Profile::default();
        profile.onboarding.arrival_date =
            NaiveDate::parse_from_str("2026-08-01", "%Y-%m-%d").ok();
        let needs = analyze_needs(&profile, &context("2026-08-30", None), &config());
        assert!(!needs.urgent);
    }

    #[test]
    fn budget_range_triggers_housing() {
        let mut profile = Profile::default();
        profile.onboarding.budget = Some(BudgetRange {
            min: Some(300.0),
            max: Some(600.0),
        });
        let needs = analyze_needs(&profile, &context("2026-08-30", None), &config());
        assert!(needs.housing);
    }

    #[test]
    fn key_signal_triggers_roommate() {
        let mut profile = Profile::default();
        profile.preferences = SynapsePreferences {
            culture: Some(CulturePrefs {
                primary_language: Some("Korean".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let needs = analyze_needs(&profile, &context("2026-08-30", None), &config());
        assert!(needs.roommate);
    }

    #[test]
    fn financial_needs_overage_beyond_multiplier() {
        let mut profile = Profile::default();
        profile.onboarding.budget = Some(BudgetRange {
            min: None,
            max: Some(500.0),
        });

        // 650 > 1.2 * 500, so the category fires.
        let needs = analyze_needs(&profile, &context("2026-08-30", Some(650.0)), &config());
        assert!(needs.financial);

        // 550 exceeds the budget but not the 1.2x gate.
        let needs = analyze_needs(&profile, &context("2026-08-30", Some(550.0)), &config());
        assert!(!needs.financial);
    }

    #[test]
    fn academic_requires_major_and_no_plan() {
        let mut profile = Profile::default();
        profile.onboarding.major = Some("Physics".to_string());
        assert!(analyze_needs(&profile, &context("2026-08-30", None), &config()).academic);

        profile.onboarding.has_academic_plan = true;
        assert!(!analyze_needs(&profile, &context("2026-08-30", None), &config()).academic);
    }

    #[test]
    fn alumni_never_trigger_academic() {
        let mut profile = Profile::default();
        profile.onboarding.major = Some("Physics".to_string());
        profile.onboarding.academic_level = Some(crate::models::AcademicStage::Alumni);
        assert!(!analyze_needs(&profile, &context("2026-08-30", None), &config()).academic);
    }
}
