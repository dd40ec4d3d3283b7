use crate::models::{non_empty, SynapsePreferences};
use serde::{Deserialize, Serialize};

/// Points awarded per compatibility signal.
///
/// Defaults are the production tuning; individual weights can be overridden
/// through the `[scoring.weights]` config section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityWeights {
    pub primary_language: i32,
    pub cross_language: i32,
    pub language_comfort: i32,
    pub home_country: i32,
    pub home_region: i32,
    pub home_city: i32,
    pub commute_overlap: i32,
    pub sleep_pattern: i32,
    pub cleanliness: i32,
    pub diet: i32,
    pub smoking: i32,
    pub drinking: i32,
    pub partying: i32,
    pub pets: i32,
}

impl Default for CompatibilityWeights {
    fn default() -> Self {
        Self {
            primary_language: 25,
            cross_language: 15,
            language_comfort: 10,
            home_country: 10,
            home_region: 8,
            home_city: 6,
            commute_overlap: 6,
            sleep_pattern: 6,
            cleanliness: 8,
            diet: 4,
            smoking: 3,
            drinking: 3,
            partying: 3,
            pets: 7,
        }
    }
}

/// Outcome of scoring one profile pair: the clamped score plus the human
/// phrases for exactly the predicates that contributed points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub score: u8,
    pub reasons: Vec<String>,
}

/// Compute a 0-100 compatibility score between two synapse preference
/// blocks by accumulating independent weighted signals.
///
/// Pure and deterministic: no I/O, never panics, missing fields simply
/// contribute zero. Invariant: `compatibility_score(a, b)` equals
/// `compatibility_score(b, a)` — the directional university boost lives in
/// the roommate generator, not here.
pub fn compatibility_score(
    me: &SynapsePreferences,
    other: &SynapsePreferences,
    weights: &CompatibilityWeights,
) -> CompatibilityResult {
    let mut points: i32 = 0;
    let mut reasons: Vec<String> = Vec::new();
    let mut award = |pts: i32, reason: &str| {
        points += pts;
        reasons.push(reason.to_string());
    };

    // Language signals
    let my_primary = me.primary_language();
    let their_primary = other.primary_language();
    if let (Some(a), Some(b)) = (my_primary, their_primary) {
        if eq_fold(a, b) {
            award(weights.primary_language, "Same daily language");
        }
    }
    if let Some(theirs) = their_primary {
        if list_contains(other_languages(me), theirs) {
            award(weights.cross_language, "You speak their language");
        }
    }
    if let Some(mine) = my_primary {
        if list_contains(other_languages(other), mine) {
            award(weights.cross_language, "They speak your language");
        }
    }
    if comfort_beyond_same(me) || comfort_beyond_same(other) {
        award(weights.language_comfort, "Open to cross-language living");
    }

    // Home signals
    if home_field_matches(me, other, |h| h.country.as_deref()) {
        award(weights.home_country, "From the same country");
    }
    if home_field_matches(me, other, |h| h.region.as_deref()) {
        award(weights.home_region, "From the same region");
    }
    if home_field_matches(me, other, |h| h.city.as_deref()) {
        award(weights.home_city, "From the same city");
    }

    // Logistics
    if commute_overlap(me, other) {
        award(weights.commute_overlap, "Overlapping commute options");
    }

    // Lifestyle
    if let (Some(a), Some(b)) = (me.sleep_pattern(), other.sleep_pattern()) {
        if eq_fold(a, b) {
            award(weights.sleep_pattern, "Similar sleep hours");
        }
    }
    if let (Some(a), Some(b)) = (me.cleanliness(), other.cleanliness()) {
        if a.abs_diff(b) <= 1 {
            award(weights.cleanliness, "Similar tidiness standards");
        }
    }

    // Habits
    if habit_matches(me, other, |h| h.diet.as_deref()) {
        award(weights.diet, "Matching diet");
    }
    if habit_matches(me, other, |h| h.smoking.as_deref()) {
        award(weights.smoking, "Same smoking habits");
    }
    if habit_matches(me, other, |h| h.drinking.as_deref()) {
        award(weights.drinking, "Same drinking habits");
    }
    if habit_matches(me, other, |h| h.partying.as_deref()) {
        award(weights.partying, "Similar social habits");
    }

    // Pets (unspecified means ok with pets)
    if me.ok_with_pets() == other.ok_with_pets() {
        award(weights.pets, "Aligned on pets");
    }

    CompatibilityResult {
        score: points.clamp(0, 100) as u8,
        reasons,
    }
}

/// Percentage of the synapse profile that is filled in, weighted per group:
/// culture 3 fields, logistics 3, lifestyle 2, habits 2, pets 1. Groups the
/// user never opened are excluded from both numerator and denominator.
pub fn synapse_completion(prefs: &SynapsePreferences) -> u8 {
    let mut filled: u32 = 0;
    let mut applicable: u32 = 0;

    if let Some(culture) = &prefs.culture {
        applicable += 3;
        filled += non_empty(culture.primary_language.as_deref()).is_some() as u32;
        filled += culture
            .other_languages
            .iter()
            .any(|l| non_empty(Some(l)).is_some()) as u32;
        filled += culture
            .home
            .as_ref()
            .and_then(|h| non_empty(h.country.as_deref()))
            .is_some() as u32;
    }

    if let Some(logistics) = &prefs.logistics {
        applicable += 3;
        filled += logistics
            .commute_modes
            .iter()
            .any(|m| non_empty(Some(m)).is_some()) as u32;
        filled += logistics.budget_max.is_some() as u32;
        filled += logistics.max_commute_minutes.is_some() as u32;
    }

    if let Some(lifestyle) = &prefs.lifestyle {
        applicable += 2;
        filled += non_empty(lifestyle.sleep_pattern.as_deref()).is_some() as u32;
        filled += lifestyle.cleanliness_level().is_some() as u32;
    }

    if let Some(habits) = &prefs.habits {
        applicable += 2;
        filled += non_empty(habits.diet.as_deref()).is_some() as u32;
        filled += non_empty(habits.smoking.as_deref()).is_some() as u32;
    }

    if let Some(pets) = &prefs.pets {
        applicable += 1;
        filled += pets.ok_with_pets.is_some() as u32;
    }

    if applicable == 0 {
        return 0;
    }

    ((100.0 * filled as f64) / applicable as f64).round() as u8
}

/// Case- and whitespace-insensitive equality for user-entered values.
#[inline]
fn eq_fold(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[inline]
fn list_contains(list: &[String], value: &str) -> bool {
    list.iter().any(|entry| eq_fold(entry, value))
}

fn other_languages(prefs: &SynapsePreferences) -> &[String] {
    prefs
        .culture
        .as_ref()
        .map(|c| c.other_languages.as_slice())
        .unwrap_or(&[])
}

/// Whether the side declared a language comfort other than "same".
fn comfort_beyond_same(prefs: &SynapsePreferences) -> bool {
    prefs
        .culture
        .as_ref()
        .and_then(|c| non_empty(c.language_comfort.as_deref()))
        .is_some_and(|comfort| !eq_fold(comfort, "same"))
}

fn home_field_matches(
    me: &SynapsePreferences,
    other: &SynapsePreferences,
    field: impl Fn(&crate::models::HomeRegion) -> Option<&str>,
) -> bool {
    let mine = me
        .culture
        .as_ref()
        .and_then(|c| c.home.as_ref())
        .and_then(|h| non_empty(field(h)));
    let theirs = other
        .culture
        .as_ref()
        .and_then(|c| c.home.as_ref())
        .and_then(|h| non_empty(field(h)));
    matches!((mine, theirs), (Some(a), Some(b)) if eq_fold(a, b))
}

fn commute_overlap(me: &SynapsePreferences, other: &SynapsePreferences) -> bool {
    let mine = me
        .logistics
        .as_ref()
        .map(|l| l.commute_modes.as_slice())
        .unwrap_or(&[]);
    let theirs = other
        .logistics
        .as_ref()
        .map(|l| l.commute_modes.as_slice())
        .unwrap_or(&[]);
    mine.iter()
        .filter_map(|m| non_empty(Some(m)))
        .any(|m| list_contains(theirs, m))
}

fn habit_matches(
    me: &SynapsePreferences,
    other: &SynapsePreferences,
    field: impl Fn(&crate::models::HabitsPrefs) -> Option<&str>,
) -> bool {
    let mine = me.habits.as_ref().and_then(|h| non_empty(field(h)));
    let theirs = other.habits.as_ref().and_then(|h| non_empty(field(h)));
    matches!((mine, theirs), (Some(a), Some(b)) if eq_fold(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CulturePrefs, HabitsPrefs, HomeRegion, LifestylePrefs, LogisticsPrefs, PetsPrefs,
    };

    fn prefs_with_language(lang: &str) -> SynapsePreferences {
        SynapsePreferences {
            culture: Some(CulturePrefs {
                primary_language: Some(lang.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn full_prefs() -> SynapsePreferences {
        SynapsePreferences {
            culture: Some(CulturePrefs {
                primary_language: Some("Spanish".to_string()),
                other_languages: vec!["English".to_string()],
                language_comfort: Some("any".to_string()),
                home: Some(HomeRegion {
                    country: Some("Mexico".to_string()),
                    region: Some("Jalisco".to_string()),
                    city: Some("Guadalajara".to_string()),
                }),
            }),
            logistics: Some(LogisticsPrefs {
                commute_modes: vec!["bus".to_string(), "bike".to_string()],
                budget_max: Some(800.0),
                max_commute_minutes: Some(40),
            }),
            lifestyle: Some(LifestylePrefs {
                sleep_pattern: Some("early".to_string()),
                cleanliness: Some(4),
            }),
            habits: Some(HabitsPrefs {
                diet: Some("vegetarian".to_string()),
                smoking: Some("never".to_string()),
                drinking: Some("socially".to_string()),
                partying: Some("rarely".to_string()),
            }),
            pets: Some(PetsPrefs {
                ok_with_pets: Some(true),
            }),
        }
    }

    #[test]
    fn score_is_clamped_to_100() {
        let prefs = full_prefs();
        let result = compatibility_score(&prefs, &prefs, &CompatibilityWeights::default());
        assert_eq!(result.score, 100);
        assert!(!result.reasons.is_empty());
    }

    #[test]
    fn empty_profiles_only_share_pet_default() {
        // Both sides default to ok-with-pets, which is the single signal
        // that can fire on fully absent data.
        let result = compatibility_score(
            &SynapsePreferences::default(),
            &SynapsePreferences::default(),
            &CompatibilityWeights::default(),
        );
        assert_eq!(result.score, 7);
        assert_eq!(result.reasons, vec!["Aligned on pets".to_string()]);
    }

    #[test]
    fn scorer_is_symmetric() {
        let a = full_prefs();
        let mut b = full_prefs();
        if let Some(culture) = &mut b.culture {
            culture.primary_language = Some("English".to_string());
            culture.language_comfort = None;
            if let Some(home) = &mut culture.home {
                home.city = Some("Monterrey".to_string());
            }
        }
        let weights = CompatibilityWeights::default();
        let ab = compatibility_score(&a, &b, &weights);
        let ba = compatibility_score(&b, &a, &weights);
        assert_eq!(ab.score, ba.score);
    }

    #[test]
    fn language_sleep_and_cleanliness_stack() {
        // Same primary language + same sleep pattern + cleanliness within 1
        // floors the score at 25 + 6 + 8 (plus the pet default).
        let mut a = prefs_with_language("Mandarin");
        a.lifestyle = Some(LifestylePrefs {
            sleep_pattern: Some("night owl".to_string()),
            cleanliness: Some(3),
        });
        let mut b = prefs_with_language("Mandarin");
        b.lifestyle = Some(LifestylePrefs {
            sleep_pattern: Some("night owl".to_string()),
            cleanliness: Some(4),
        });

        let result = compatibility_score(&a, &b, &CompatibilityWeights::default());
        assert!(result.score >= 39);
        assert!(result.reasons.iter().any(|r| r.contains("language")));
        assert!(result.reasons.iter().any(|r| r.contains("sleep")));
    }

    #[test]
    fn empty_strings_never_match() {
        let a = prefs_with_language("");
        let b = prefs_with_language("");
        let result = compatibility_score(&a, &b, &CompatibilityWeights::default());
        assert!(!result
            .reasons
            .iter()
            .any(|r| r.contains("Same daily language")));
    }

    #[test]
    fn missing_cleanliness_disqualifies_closeness() {
        let mut a = SynapsePreferences::default();
        a.lifestyle = Some(LifestylePrefs {
            sleep_pattern: None,
            cleanliness: Some(3),
        });
        let b = SynapsePreferences::default();
        let result = compatibility_score(&a, &b, &CompatibilityWeights::default());
        assert!(!result.reasons.iter().any(|r| r.contains("tidiness")));
    }

    #[test]
    fn cross_language_fires_per_direction() {
        let mut a = prefs_with_language("French");
        if let Some(culture) = &mut a.culture {
            culture.other_languages = vec!["German".to_string()];
        }
        let mut b = prefs_with_language("German");
        if let Some(culture) = &mut b.culture {
            culture.other_languages = vec!["French".to_string()];
        }
        let result = compatibility_score(&a, &b, &CompatibilityWeights::default());
        // 15 both directions + 7 pets
        assert_eq!(result.score, 37);
    }

    #[test]
    fn pet_mismatch_awards_nothing() {
        let a = SynapsePreferences {
            pets: Some(PetsPrefs {
                ok_with_pets: Some(false),
            }),
            ..Default::default()
        };
        let b = SynapsePreferences::default();
        let result = compatibility_score(&a, &b, &CompatibilityWeights::default());
        assert_eq!(result.score, 0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn completion_counts_only_present_groups() {
        let prefs = SynapsePreferences {
            lifestyle: Some(LifestylePrefs {
                sleep_pattern: Some("early".to_string()),
                cleanliness: None,
            }),
            ..Default::default()
        };
        // One of two lifestyle fields, no other groups applicable.
        assert_eq!(synapse_completion(&prefs), 50);
    }

    #[test]
    fn completion_is_zero_for_empty_prefs() {
        assert_eq!(synapse_completion(&SynapsePreferences::default()), 0);
    }

    #[test]
    fn completion_full_profile_is_100() {
        assert_eq!(synapse_completion(&full_prefs()), 100);
    }

    #[test]
    fn completion_rounds_to_nearest() {
        let prefs = SynapsePreferences {
            culture: Some(CulturePrefs {
                primary_language: Some("English".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        // 1 of 3 culture fields = 33.33 -> 33
        assert_eq!(synapse_completion(&prefs), 33);
    }
}
