use crate::core::pipeline::{InsightSource, PipelineConfig, SourceError};
use crate::core::scoring::{compatibility_score, synapse_completion};
use crate::models::{
    non_empty, Category, DashboardContext, GroupItem, GroupKind, Insight, InsightGroup, Priority,
    Profile, Property, RoommateCandidate,
};
use std::future::Future;
use std::time::Duration;

/// Collaborator caps mirrored locally so a misbehaving backend cannot
/// inflate a request.
const HOUSING_LOOKUP_CAP: usize = 5;
const ROOMMATE_LOOKUP_CAP: usize = 50;
const GROUP_TOP_N: usize = 3;

/// Bound a collaborator lookup; a timeout reads as a lookup failure.
async fn guarded<T>(
    timeout: Duration,
    lookup: impl Future<Output = Result<T, SourceError>>,
) -> Result<T, SourceError> {
    match tokio::time::timeout(timeout, lookup).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout),
    }
}

/// Housing generator: top budget-matched listings as one grouped insight.
/// Never fails the pipeline; lookup trouble becomes a low-priority
/// "search unavailable" insight.
pub async fn housing_insights<S: InsightSource>(
    profile: &Profile,
    source: &S,
    config: &PipelineConfig,
) -> Vec<Insight> {
    let budget = profile.search_budget();
    let lookup = guarded(
        config.generator_timeout(),
        source.find_housing_candidates(&budget),
    )
    .await;

    let mut properties = match lookup {
        Ok(properties) => properties,
        Err(err) => {
            tracing::warn!("housing lookup failed for {}: {}", profile.user_id, err);
            return vec![Insight::info(
                "housing-unavailable",
                "Housing search is taking a break",
                "We could not reach the listing search right now. Your saved filters are untouched.",
                Priority::Low,
                Category::Housing,
                "Retry search later",
            )];
        }
    };

    properties.retain(|p| p.available);
    properties.truncate(HOUSING_LOOKUP_CAP);

    if properties.is_empty() {
        return vec![Insight::info(
            "housing-no-results",
            "No listings fit your filters yet",
            "Nothing currently matches your budget. Widening the price range or area usually surfaces more options.",
            Priority::Medium,
            Category::Housing,
            "Adjust search filters",
        )];
    }

    let total = properties.len();
    let items: Vec<GroupItem> = properties
        .iter()
        .take(GROUP_TOP_N)
        .enumerate()
        .map(|(idx, property)| {
            let rank = (idx + 1) as u8;
            GroupItem {
                rank,
                id: property.id.clone(),
                label: property.title.clone(),
                detail: Some(property_detail(property)),
                // Rank 2 gets the spotlight slot in the dashboard card.
                priority: if rank == 2 {
                    Priority::High
                } else {
                    Priority::Medium
                },
                link: format!("/housing/{}", property.id),
                reasons: Vec::new(),
                score: None,
            }
        })
        .collect();

    let message = match profile.budget_cap() {
        Some(cap) => format!(
            "{} listing{} within your ${:.0} budget, ranked by relevance.",
            total,
            plural(total),
            cap
        ),
        None => format!("{} listing{} matched your housing needs.", total, plural(total)),
    };

    vec![Insight::grouped(
        "housing-options",
        "Top housing picks for you",
        message,
        Priority::High,
        Category::Housing,
        "View properties",
        InsightGroup {
            kind: GroupKind::Properties,
            items,
        },
    )]
}

fn property_detail(property: &Property) -> String {
    let mut detail = format!("${:.0}/mo", property.price);
    if let Some(bedrooms) = property.bedrooms {
        detail.push_str(&format!(" · {} bd", bedrooms));
    }
    if let Some(address) = non_empty(property.address.as_deref()) {
        detail.push_str(&format!(" · {}", address));
    }
    detail
}

/// Roommate generator: score every candidate against the requester, keep
/// those above the match floor, and surface the top three.
pub async fn roommate_insights<S: InsightSource>(
    profile: &Profile,
    source: &S,
    config: &PipelineConfig,
) -> Vec<Insight> {
    let lookup = guarded(
        config.generator_timeout(),
        source.find_roommate_candidates(&profile.user_id),
    )
    .await;

    let mut candidates = match lookup {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!("roommate lookup failed for {}: {}", profile.user_id, err);
            return vec![Insight::info(
                "roommate-unavailable",
                "Roommate matching is unavailable",
                "We could not run compatibility matching right now. You can still browse profiles directly.",
                Priority::Low,
                Category::Roommate,
                "Browse roommates manually",
            )];
        }
    };

    candidates.truncate(ROOMMATE_LOOKUP_CAP);

    if candidates.is_empty() {
        return vec![Insight::info(
            "roommate-expand-network",
            "No roommate candidates yet",
            "Nobody in your area is looking right now. Joining community groups widens your pool.",
            Priority::Medium,
            Category::Roommate,
            "Explore the community",
        )];
    }

    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let result =
                compatibility_score(&profile.preferences, &candidate.preferences, &config.weights);
            let score = apply_university_bonus(
                result.score,
                profile,
                &candidate,
                config.university_bonus,
            );
            if score > config.match_score_floor {
                Some(ScoredCandidate {
                    candidate,
                    score,
                    reasons: result.reasons,
                })
            } else {
                None
            }
        })
        .collect();

    if scored.is_empty() {
        // Candidates exist but there is too little profile data to compare.
        return vec![Insight::info(
            "roommate-complete-profile",
            "Tell us more to find your match",
            "We found potential roommates, but your preferences are too sparse to compare well. A fuller profile unlocks real matches.",
            Priority::Medium,
            Category::Roommate,
            "Complete your Synapse profile",
        )];
    }

    // Stable sort keeps collaborator relevance order for equal scores.
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let total = scored.len();
    let best_name = scored[0].candidate.name.clone();
    let best_score = scored[0].score;

    let items: Vec<GroupItem> = scored
        .into_iter()
        .take(GROUP_TOP_N)
        .enumerate()
        .map(|(idx, entry)| {
            let rank = (idx + 1) as u8;
            GroupItem {
                rank,
                id: entry.candidate.user_id.clone(),
                label: entry.candidate.name.clone(),
                detail: entry.candidate.university.clone(),
                priority: if rank == 1 {
                    Priority::High
                } else {
                    Priority::Medium
                },
                link: format!("/roommates/{}", entry.candidate.user_id),
                reasons: entry.reasons,
                score: Some(entry.score),
            }
        })
        .collect();

    vec![Insight::grouped(
        "roommate-matches",
        format!("{} is a {}% match", best_name, best_score),
        format!(
            "{} compatible roommate{} found, ranked by compatibility.",
            total,
            plural(total)
        ),
        Priority::High,
        Category::Roommate,
        "Message your top match",
        InsightGroup {
            kind: GroupKind::Roommates,
            items,
        },
    )]
}

struct ScoredCandidate {
    candidate: RoommateCandidate,
    score: u8,
    reasons: Vec<String>,
}

/// Same-university candidates get a flat bonus, re-capped at 100. This is a
/// soft marketplace preference and intentionally lives outside the scorer.
fn apply_university_bonus(
    score: u8,
    profile: &Profile,
    candidate: &RoommateCandidate,
    bonus: u8,
) -> u8 {
    let mine = non_empty(profile.university.as_deref());
    let theirs = non_empty(candidate.university.as_deref());
    match (mine, theirs) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => score.saturating_add(bonus).min(100),
        _ => score,
    }
}

/// Financial generator: one high-priority warning when average rent
/// exceeds the user's budget ceiling.
pub fn financial_insights(profile: &Profile, context: &DashboardContext) -> Vec<Insight> {
    let (Some(cap), Some(average)) = (profile.budget_cap(), context.average_property_price) else {
        return Vec::new();
    };
    if average <= cap {
        return Vec::new();
    }
    vec![Insight::warning(
        "budget-overage",
        "Average rent is above your budget",
        format!(
            "Listings currently average ${:.0}, above your ${:.0} budget. Sharing with a roommate or widening your search radius can close the gap.",
            average, cap
        ),
        Priority::High,
        Category::Financial,
        "Review your budget",
    )]
}

/// Academic generator: nudge majors without a plan toward creating one.
pub fn academic_insights(profile: &Profile) -> Vec<Insight> {
    let Some(major) = non_empty(profile.onboarding.major.as_deref()) else {
        return Vec::new();
    };
    if profile.onboarding.has_academic_plan {
        return Vec::new();
    }
    vec![Insight::info(
        "academic-plan",
        "Map out your semester",
        format!(
            "You declared {} but have no academic plan yet. A plan keeps course picks and deadlines in one place.",
            major
        ),
        Priority::Medium,
        Category::Academic,
        "Create your academic plan",
    )]
}

/// Urgent generator: arrival inside the countdown window gets a critical
/// call-out with the day count.
pub fn urgent_insights(
    profile: &Profile,
    context: &DashboardContext,
    config: &PipelineConfig,
) -> Vec<Insight> {
    let Some(days) = profile.days_until_arrival(context.today) else {
        return Vec::new();
    };
    if !(0..=config.urgent_arrival_window_days).contains(&days) {
        return Vec::new();
    }
    let message = if days == 0 {
        "You arrive today. Double-check your housing and key handover details.".to_string()
    } else {
        format!(
            "You arrive in {} day{}. Locking in housing now avoids a scramble on landing.",
            days,
            plural(days as usize)
        )
    };
    vec![Insight::warning(
        "arrival-countdown",
        "Your arrival is coming up",
        message,
        Priority::Critical,
        Category::Urgent,
        "Review your arrival checklist",
    )]
}

/// Cross-cutting nudge: when the roommate category did not trigger but the
/// user has started a synapse profile, prompt them to finish it.
pub fn completion_nudge(profile: &Profile, config: &PipelineConfig) -> Vec<Insight> {
    if profile.preferences.is_empty() {
        return Vec::new();
    }
    let completion = synapse_completion(&profile.preferences);
    if completion >= config.completion_nudge_floor {
        return Vec::new();
    }
    vec![Insight::info(
        "synapse-completion",
        "Finish your Synapse profile",
        format!(
            "Your Synapse profile is {}% complete. Finishing it unlocks roommate compatibility matching.",
            completion
        ),
        Priority::High,
        Category::Social,
        "Complete your Synapse profile",
    )]
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
