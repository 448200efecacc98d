//! Entitlement data types

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors from the strict parsing surface.
///
/// Resolver functions never return these; they fail closed instead.
/// Only `FromStr` on the key/plan enums is fallible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntitlementError {
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
    #[error("unknown feature key: {0}")]
    UnknownFeature(String),
    #[error("unknown limit key: {0}")]
    UnknownLimit(String),
}

/// Canonical subscription plan identifier.
///
/// Declaration order is tier order: `Free < Student < Starter < Pro`.
/// The derived `Ord` is the upgrade direction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    #[default]
    Free,
    Student,
    Starter,
    Pro,
}

/// Known spellings of plan labels, lowercased and trimmed.
///
/// Covers canonical names, legacy tier names, and localized display
/// strings that have leaked into stored user records over time.
static PLAN_ALIASES: Lazy<HashMap<&'static str, PlanId>> = Lazy::new(|| {
    let mut map = HashMap::new();
    // Canonical names map to themselves so normalization is idempotent.
    map.insert("free", PlanId::Free);
    map.insert("student", PlanId::Student);
    map.insert("starter", PlanId::Starter);
    map.insert("pro", PlanId::Pro);
    // Legacy tier names
    map.insert("basic", PlanId::Free);
    map.insert("trial", PlanId::Free);
    map.insert("standard", PlanId::Starter);
    map.insert("plus", PlanId::Starter);
    map.insert("premium", PlanId::Pro);
    map.insert("professional", PlanId::Pro);
    map.insert("unlimited", PlanId::Pro);
    // Localized labels seen in older user records
    map.insert("gratis", PlanId::Free);
    map.insert("gratuit", PlanId::Free);
    map.insert("estudiante", PlanId::Student);
    map.insert("edu", PlanId::Student);
    map
});

impl PlanId {
    /// All plans in ascending tier order.
    pub const ALL: [PlanId; 4] = [Self::Free, Self::Student, Self::Starter, Self::Pro];

    /// The canonical lowercase name for this plan.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Student => "student",
            Self::Starter => "starter",
            Self::Pro => "pro",
        }
    }

    /// Position in the tier order (0 = lowest).
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Resolve an arbitrary plan label to a canonical plan.
    ///
    /// Lowercases and trims the input, then looks it up in the alias
    /// table. Unknown labels and absent values resolve to [`PlanId::Free`];
    /// this never fails and is idempotent on canonical names.
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Free;
        };
        let key = raw.trim().to_lowercase();
        match PLAN_ALIASES.get(key.as_str()) {
            Some(plan) => *plan,
            None => {
                if !key.is_empty() {
                    debug!(label = %key, "Unrecognized plan label, falling back to free");
                }
                Self::Free
            }
        }
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = EntitlementError;

    /// Strict case-insensitive parse. Accepts any known alias but, unlike
    /// [`PlanId::normalize`], rejects unrecognized labels.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim().to_lowercase();
        PLAN_ALIASES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| EntitlementError::UnknownPlan(value.to_string()))
    }
}

/// A numeric ceiling for one plan limit.
///
/// Serialized as the raw integer convention consumers already speak:
/// `-1` unlimited, `0` disabled, `N` a hard ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Limit {
    Unlimited,
    Disabled,
    Bounded(u32),
}

impl Limit {
    /// The raw sentinel form: `-1` unlimited, `0` disabled, `N` bounded.
    pub fn as_raw(&self) -> i64 {
        match self {
            Self::Unlimited => -1,
            Self::Disabled => 0,
            Self::Bounded(n) => i64::from(*n),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Whether one more use is allowed at the given usage count.
    pub fn allows(&self, used: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Disabled => false,
            Self::Bounded(max) => used < *max,
        }
    }

    /// Remaining uses, `None` when unlimited.
    pub fn remaining(&self, used: u32) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Disabled => Some(0),
            Self::Bounded(max) => Some(max.saturating_sub(used)),
        }
    }
}

impl From<i64> for Limit {
    /// Total conversion from the raw convention. `-1` is unlimited, `0` is
    /// disabled, positive values are ceilings. Any other negative value is
    /// malformed and resolves to disabled.
    fn from(raw: i64) -> Self {
        match raw {
            -1 => Self::Unlimited,
            n if n <= 0 => Self::Disabled,
            n => Self::Bounded(u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> i64 {
        limit.as_raw()
    }
}

/// Boolean capability flags gated by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKey {
    Flashcards,
    Quizzes,
    WebSearchChat,
    BibliographyExport,
    AudioSummaries,
    PriorityProcessing,
}

impl FeatureKey {
    /// All feature keys.
    pub const ALL: [FeatureKey; 6] = [
        Self::Flashcards,
        Self::Quizzes,
        Self::WebSearchChat,
        Self::BibliographyExport,
        Self::AudioSummaries,
        Self::PriorityProcessing,
    ];
}

impl FromStr for FeatureKey {
    type Err = EntitlementError;

    /// Accepts camelCase and snake_case spellings, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('_', "").as_str() {
            "flashcards" => Ok(Self::Flashcards),
            "quizzes" => Ok(Self::Quizzes),
            "websearchchat" => Ok(Self::WebSearchChat),
            "bibliographyexport" => Ok(Self::BibliographyExport),
            "audiosummaries" => Ok(Self::AudioSummaries),
            "priorityprocessing" => Ok(Self::PriorityProcessing),
            _ => Err(EntitlementError::UnknownFeature(value.to_string())),
        }
    }
}

/// Named numeric ceilings gated by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitKey {
    MonthlyAnalyses,
    MaxVideoMinutes,
    ChatQuestionsPerVideo,
    FlashcardExports,
    QuizExports,
}

impl FromStr for LimitKey {
    type Err = EntitlementError;

    /// Accepts camelCase and snake_case spellings, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('_', "").as_str() {
            "monthlyanalyses" => Ok(Self::MonthlyAnalyses),
            "maxvideominutes" => Ok(Self::MaxVideoMinutes),
            "chatquestionspervideo" => Ok(Self::ChatQuestionsPerVideo),
            "flashcardexports" => Ok(Self::FlashcardExports),
            "quizexports" => Ok(Self::QuizExports),
            _ => Err(EntitlementError::UnknownLimit(value.to_string())),
        }
    }
}

/// Subscription status as reported by the billing provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
}

/// Subscription record as supplied by the session provider.
///
/// The plan label is carried raw; callers never have to normalize it
/// themselves before asking entitlement questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Raw plan label from the user record, possibly legacy or localized.
    pub plan: Option<String>,
    pub status: SubscriptionStatus,
    /// End of the current billing period, Unix timestamp in ms.
    pub current_period_end: Option<i64>,
}

impl Subscription {
    /// Whether the subscription currently confers its plan's entitlements.
    ///
    /// Active and trialing subscriptions qualify. Canceled subscriptions
    /// qualify until the paid period ends (user canceled but paid through
    /// the end of the billing period). Past-due and incomplete do not.
    pub fn in_good_standing(&self) -> bool {
        match self.status {
            SubscriptionStatus::Active | SubscriptionStatus::Trialing => true,
            SubscriptionStatus::Canceled => match self.current_period_end {
                Some(period_end) => {
                    let still_valid = period_end > Utc::now().timestamp_millis();
                    if still_valid {
                        debug!(period_end, "Canceled subscription still within paid period");
                    }
                    still_valid
                }
                // No period end recorded, treat as expired
                None => false,
            },
            SubscriptionStatus::PastDue | SubscriptionStatus::Incomplete => false,
        }
    }

    /// The plan whose entitlements actually apply right now.
    ///
    /// A subscription that is not in good standing degrades to
    /// [`PlanId::Free`] regardless of its nominal plan.
    pub fn effective_plan(&self) -> PlanId {
        if self.in_good_standing() {
            PlanId::normalize(self.plan.as_deref())
        } else {
            PlanId::Free
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_canonical_is_idempotent() {
        for plan in PlanId::ALL {
            assert_eq!(PlanId::normalize(Some(plan.as_str())), plan);
        }
    }

    #[test]
    fn test_normalize_case_and_whitespace() {
        assert_eq!(PlanId::normalize(Some("  PRO ")), PlanId::Pro);
        assert_eq!(PlanId::normalize(Some("Student")), PlanId::Student);
        assert_eq!(PlanId::normalize(Some("\tSTARTER\n")), PlanId::Starter);
    }

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(PlanId::normalize(Some("premium")), PlanId::Pro);
        assert_eq!(PlanId::normalize(Some("standard")), PlanId::Starter);
        assert_eq!(PlanId::normalize(Some("estudiante")), PlanId::Student);
        assert_eq!(PlanId::normalize(Some("trial")), PlanId::Free);
    }

    #[test]
    fn test_normalize_unknown_falls_back_to_free() {
        assert_eq!(PlanId::normalize(Some("enterprise-2019")), PlanId::Free);
        assert_eq!(PlanId::normalize(Some("")), PlanId::Free);
        assert_eq!(PlanId::normalize(None), PlanId::Free);
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!("Pro".parse::<PlanId>(), Ok(PlanId::Pro));
        assert!(matches!(
            "mystery".parse::<PlanId>(),
            Err(EntitlementError::UnknownPlan(_))
        ));
    }

    #[test]
    fn test_plan_order() {
        assert!(PlanId::Free < PlanId::Student);
        assert!(PlanId::Student < PlanId::Starter);
        assert!(PlanId::Starter < PlanId::Pro);
        assert_eq!(PlanId::Free.rank(), 0);
        assert_eq!(PlanId::Pro.rank(), 3);
    }

    #[test]
    fn test_limit_raw_round_trip() {
        assert_eq!(Limit::from(-1), Limit::Unlimited);
        assert_eq!(Limit::from(0), Limit::Disabled);
        assert_eq!(Limit::from(5), Limit::Bounded(5));
        // Malformed negatives fail closed
        assert_eq!(Limit::from(-7), Limit::Disabled);

        assert_eq!(Limit::Unlimited.as_raw(), -1);
        assert_eq!(Limit::Disabled.as_raw(), 0);
        assert_eq!(Limit::Bounded(42).as_raw(), 42);
    }

    #[test]
    fn test_limit_allows_and_remaining() {
        assert!(Limit::Unlimited.allows(u32::MAX));
        assert_eq!(Limit::Unlimited.remaining(100), None);

        assert!(!Limit::Disabled.allows(0));
        assert_eq!(Limit::Disabled.remaining(0), Some(0));

        assert!(Limit::Bounded(3).allows(2));
        assert!(!Limit::Bounded(3).allows(3));
        assert_eq!(Limit::Bounded(3).remaining(1), Some(2));
        assert_eq!(Limit::Bounded(3).remaining(9), Some(0));
    }

    #[test]
    fn test_limit_serde_uses_raw_convention() {
        assert_eq!(serde_json::to_string(&Limit::Unlimited).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&Limit::Bounded(3)).unwrap(), "3");
        let limit: Limit = serde_json::from_str("-1").unwrap();
        assert_eq!(limit, Limit::Unlimited);
    }

    #[test]
    fn test_key_parsing_accepts_both_spellings() {
        assert_eq!(
            "monthlyAnalyses".parse::<LimitKey>(),
            Ok(LimitKey::MonthlyAnalyses)
        );
        assert_eq!(
            "monthly_analyses".parse::<LimitKey>(),
            Ok(LimitKey::MonthlyAnalyses)
        );
        assert_eq!(
            "webSearchChat".parse::<FeatureKey>(),
            Ok(FeatureKey::WebSearchChat)
        );
        assert!("ocr".parse::<FeatureKey>().is_err());
    }

    #[test]
    fn test_effective_plan_good_standing() {
        let sub = Subscription {
            plan: Some("pro".to_string()),
            status: SubscriptionStatus::Active,
            current_period_end: None,
        };
        assert_eq!(sub.effective_plan(), PlanId::Pro);

        let trialing = Subscription {
            status: SubscriptionStatus::Trialing,
            ..sub.clone()
        };
        assert_eq!(trialing.effective_plan(), PlanId::Pro);
    }

    #[test]
    fn test_effective_plan_degrades_when_inactive() {
        let sub = Subscription {
            plan: Some("pro".to_string()),
            status: SubscriptionStatus::PastDue,
            current_period_end: None,
        };
        assert_eq!(sub.effective_plan(), PlanId::Free);
    }

    #[test]
    fn test_canceled_subscription_grace_period() {
        let future = Utc::now().timestamp_millis() + 86_400_000;
        let past = Utc::now().timestamp_millis() - 86_400_000;

        let paid_through = Subscription {
            plan: Some("student".to_string()),
            status: SubscriptionStatus::Canceled,
            current_period_end: Some(future),
        };
        assert_eq!(paid_through.effective_plan(), PlanId::Student);

        let expired = Subscription {
            current_period_end: Some(past),
            ..paid_through.clone()
        };
        assert_eq!(expired.effective_plan(), PlanId::Free);

        let no_period = Subscription {
            current_period_end: None,
            ..paid_through
        };
        assert_eq!(no_period.effective_plan(), PlanId::Free);
    }
}
