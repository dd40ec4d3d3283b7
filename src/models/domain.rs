use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Dashboard focus areas a user can select during onboarding.
///
/// The wire value "Everything" is expanded into the full set at
/// deserialization time, so downstream code never special-cases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FocusArea {
    Housing,
    Roommate,
    Financial,
    Academic,
    Social,
}

impl FocusArea {
    pub const ALL: [FocusArea; 5] = [
        FocusArea::Housing,
        FocusArea::Roommate,
        FocusArea::Financial,
        FocusArea::Academic,
        FocusArea::Social,
    ];

    fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Housing" => Some(FocusArea::Housing),
            "Roommate" => Some(FocusArea::Roommate),
            "Financial" => Some(FocusArea::Financial),
            "Academic" => Some(FocusArea::Academic),
            "Social" => Some(FocusArea::Social),
            _ => None,
        }
    }
}

/// Deserialize a focus list, expanding "Everything" and dropping
/// unrecognized labels (malformed data is treated as absent, never an error).
fn deserialize_focus<'de, D>(deserializer: D) -> Result<BTreeSet<FocusArea>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels: Vec<String> = Vec::deserialize(deserializer)?;
    let mut focus = BTreeSet::new();
    for label in &labels {
        if label.trim() == "Everything" {
            focus.extend(FocusArea::ALL);
        } else if let Some(area) = FocusArea::from_label(label) {
            focus.insert(area);
        }
    }
    Ok(focus)
}

/// Where the user is in their academic journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcademicStage {
    Undergraduate,
    Graduate,
    Doctoral,
    Alumni,
    Working,
}

impl AcademicStage {
    /// Alumni and already-working users are past academic planning.
    pub fn is_past_study(&self) -> bool {
        matches!(self, AcademicStage::Alumni | AcademicStage::Working)
    }
}

/// Monthly budget range from onboarding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BudgetRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl BudgetRange {
    /// Normalize a range whose bounds arrived swapped.
    pub fn normalized(self) -> Self {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Self {
                min: Some(max),
                max: Some(min),
            },
            _ => self,
        }
    }
}

/// Onboarding answers captured when the user first signs up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Onboarding {
    #[serde(default, deserialize_with = "deserialize_focus")]
    pub focus: BTreeSet<FocusArea>,
    #[serde(rename = "budgetRange", default)]
    pub budget: Option<BudgetRange>,
    #[serde(rename = "housingNeeds", default)]
    pub housing_needs: Vec<String>,
    #[serde(rename = "arrivalDate", default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(rename = "academicLevel", default)]
    pub academic_level: Option<AcademicStage>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(rename = "hasAcademicPlan", default)]
    pub has_academic_plan: bool,
}

/// Cultural and language background.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CulturePrefs {
    #[serde(rename = "primaryLanguage", default)]
    pub primary_language: Option<String>,
    #[serde(rename = "otherLanguages", default)]
    pub other_languages: Vec<String>,
    #[serde(rename = "languageComfort", default)]
    pub language_comfort: Option<String>,
    #[serde(default)]
    pub home: Option<HomeRegion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeRegion {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Commute and budget logistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogisticsPrefs {
    #[serde(rename = "commuteMode", default)]
    pub commute_modes: Vec<String>,
    #[serde(rename = "budgetMax", default)]
    pub budget_max: Option<f64>,
    #[serde(rename = "maxCommuteMinutes", default)]
    pub max_commute_minutes: Option<u32>,
}

/// Daily-rhythm preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifestylePrefs {
    #[serde(rename = "sleepPattern", default)]
    pub sleep_pattern: Option<String>,
    /// Tidiness on a 1-5 scale; out-of-range values are treated as absent.
    #[serde(default)]
    pub cleanliness: Option<u8>,
}

impl LifestylePrefs {
    pub fn cleanliness_level(&self) -> Option<u8> {
        self.cleanliness.filter(|c| (1..=5).contains(c))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitsPrefs {
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default)]
    pub smoking: Option<String>,
    #[serde(default)]
    pub drinking: Option<String>,
    #[serde(default)]
    pub partying: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetsPrefs {
    #[serde(rename = "okWithPets", default)]
    pub ok_with_pets: Option<bool>,
}

/// Structured lifestyle/culture/logistics preference block ("synapse data"),
/// used as the compatibility-scoring input. Every group is optional: an
/// absent group means "not applicable", not "incomplete".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynapsePreferences {
    #[serde(default)]
    pub culture: Option<CulturePrefs>,
    #[serde(default)]
    pub logistics: Option<LogisticsPrefs>,
    #[serde(default)]
    pub lifestyle: Option<LifestylePrefs>,
    #[serde(default)]
    pub habits: Option<HabitsPrefs>,
    #[serde(default)]
    pub pets: Option<PetsPrefs>,
}

impl SynapsePreferences {
    pub fn primary_language(&self) -> Option<&str> {
        self.culture
            .as_ref()
            .and_then(|c| non_empty(c.primary_language.as_deref()))
    }

    pub fn sleep_pattern(&self) -> Option<&str> {
        self.lifestyle
            .as_ref()
            .and_then(|l| non_empty(l.sleep_pattern.as_deref()))
    }

    pub fn cleanliness(&self) -> Option<u8> {
        self.lifestyle.as_ref().and_then(|l| l.cleanliness_level())
    }

    /// Pet tolerance defaults to true when unspecified.
    pub fn ok_with_pets(&self) -> bool {
        self.pets
            .as_ref()
            .and_then(|p| p.ok_with_pets)
            .unwrap_or(true)
    }

    pub fn budget_max(&self) -> Option<f64> {
        self.logistics.as_ref().and_then(|l| l.budget_max)
    }

    pub fn is_empty(&self) -> bool {
        self.culture.is_none()
            && self.logistics.is_none()
            && self.lifestyle.is_none()
            && self.habits.is_none()
            && self.pets.is_none()
    }
}

/// Treat empty/whitespace strings as absent.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Normalized user profile: onboarding answers plus synapse preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub onboarding: Onboarding,
    #[serde(default)]
    pub preferences: SynapsePreferences,
}

impl Profile {
    /// The user's effective budget ceiling: synapse logistics first,
    /// onboarding range as the fallback.
    pub fn budget_cap(&self) -> Option<f64> {
        self.preferences
            .budget_max()
            .or_else(|| self.onboarding.budget.and_then(|b| b.normalized().max))
    }

    /// Budget range used for property search.
    pub fn search_budget(&self) -> BudgetRange {
        self.onboarding
            .budget
            .map(BudgetRange::normalized)
            .unwrap_or(BudgetRange {
                min: None,
                max: self.preferences.budget_max(),
            })
    }

    /// Days until the user arrives, relative to `today`. Negative means
    /// the arrival date has passed.
    pub fn days_until_arrival(&self, today: NaiveDate) -> Option<i64> {
        self.onboarding
            .arrival_date
            .map(|arrival| (arrival - today).num_days())
    }
}

/// Aggregate dashboard stats consumed read-only by the pipeline. `today` is
/// injected by the caller so arrival-window math stays deterministic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DashboardContext {
    #[serde(rename = "averagePropertyPrice", default)]
    pub average_property_price: Option<f64>,
    #[serde(rename = "propertyCount", default)]
    pub property_count: u64,
    #[serde(rename = "marketplaceCount", default)]
    pub marketplace_count: u64,
    pub today: NaiveDate,
}

/// A property listing returned by the housing collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub address: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

/// A potential roommate returned by the candidate collaborator, carrying
/// their own synapse preference block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoommateCandidate {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub preferences: SynapsePreferences,
}

/// Priority tier of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight used by the prioritizer (higher sorts first).
    pub const fn weight(self) -> u8 {
        match self {
            Priority::Critical => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Insight category, also used as the tiebreak key when priorities match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Urgent,
    Housing,
    Roommate,
    Financial,
    Academic,
    Social,
}

impl Category {
    pub const fn weight(self) -> u8 {
        match self {
            Category::Urgent => 5,
            Category::Housing => 4,
            Category::Roommate => 3,
            Category::Financial => 2,
            Category::Academic => 1,
            Category::Social => 0,
        }
    }
}

/// What kind of entities a grouped insight ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Properties,
    Roommates,
}

/// One ranked entry inside a grouped insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupItem {
    pub rank: u8,
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub detail: Option<String>,
    pub priority: Priority,
    pub link: String,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub score: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightGroup {
    pub kind: GroupKind,
    pub items: Vec<GroupItem>,
}

/// Body variants, discriminated on the wire by `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InsightBody {
    Info,
    Warning,
    Grouped { group: InsightGroup },
}

/// A ranked, user-facing recommendation produced by the pipeline. Created
/// fresh per request and never persisted; `id` is a stable slug per semantic
/// content so the UI can key on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub category: Category,
    pub action: String,
    #[serde(flatten)]
    pub body: InsightBody,
}

impl Insight {
    pub fn info(
        id: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
        category: Category,
        action: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            message: message.into(),
            priority,
            category,
            action: action.to_string(),
            body: InsightBody::Info,
        }
    }

    pub fn warning(
        id: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
        category: Category,
        action: &str,
    ) -> Self {
        Self {
            body: InsightBody::Warning,
            ..Self::info(id, title, message, priority, category, action)
        }
    }

    pub fn grouped(
        id: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
        category: Category,
        action: &str,
        group: InsightGroup,
    ) -> Self {
        Self {
            body: InsightBody::Grouped { group },
            ..Self::info(id, title, message, priority, category, action)
        }
    }
}
