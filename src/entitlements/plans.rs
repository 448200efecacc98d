//! Static plan tables and resolution functions
//!
//! One canonical table per concern, total over [`PlanId`]:
//! - [`PlanLimits`] — numeric ceilings
//! - [`PlanFeatures`] — boolean capability flags
//! - [`PlanInfo`] — presentation metadata, no behavioral authority
//!
//! Behavioral decisions route only through limits and features; `PlanInfo`
//! exists for pricing pages and upsell copy.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{FeatureKey, Limit, LimitKey, PlanId};

/// Numeric ceilings for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub monthly_analyses: Limit,
    pub max_video_minutes: Limit,
    pub chat_questions_per_video: Limit,
    pub flashcard_exports: Limit,
    pub quiz_exports: Limit,
}

impl PlanLimits {
    /// Get limits for a given plan.
    pub fn for_plan(plan: PlanId) -> Self {
        match plan {
            PlanId::Free => Self {
                monthly_analyses: Limit::Bounded(3),
                max_video_minutes: Limit::Bounded(20),
                chat_questions_per_video: Limit::Bounded(5),
                flashcard_exports: Limit::Disabled,
                quiz_exports: Limit::Disabled,
            },
            PlanId::Student => Self {
                monthly_analyses: Limit::Bounded(30),
                max_video_minutes: Limit::Bounded(60),
                chat_questions_per_video: Limit::Bounded(30),
                flashcard_exports: Limit::Bounded(10),
                quiz_exports: Limit::Bounded(10),
            },
            PlanId::Starter => Self {
                monthly_analyses: Limit::Bounded(100),
                max_video_minutes: Limit::Bounded(120),
                chat_questions_per_video: Limit::Bounded(100),
                flashcard_exports: Limit::Unlimited,
                quiz_exports: Limit::Unlimited,
            },
            PlanId::Pro => Self {
                monthly_analyses: Limit::Unlimited,
                max_video_minutes: Limit::Bounded(240),
                chat_questions_per_video: Limit::Unlimited,
                flashcard_exports: Limit::Unlimited,
                quiz_exports: Limit::Unlimited,
            },
        }
    }

    /// Get the ceiling for a specific limit key.
    pub fn get(&self, key: LimitKey) -> Limit {
        match key {
            LimitKey::MonthlyAnalyses => self.monthly_analyses,
            LimitKey::MaxVideoMinutes => self.max_video_minutes,
            LimitKey::ChatQuestionsPerVideo => self.chat_questions_per_video,
            LimitKey::FlashcardExports => self.flashcard_exports,
            LimitKey::QuizExports => self.quiz_exports,
        }
    }
}

/// Capability flags for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    pub flashcards: bool,
    pub quizzes: bool,
    pub web_search_chat: bool,
    pub bibliography_export: bool,
    pub audio_summaries: bool,
    pub priority_processing: bool,
}

impl PlanFeatures {
    /// Get feature flags for a given plan.
    pub fn for_plan(plan: PlanId) -> Self {
        match plan {
            PlanId::Free => Self {
                flashcards: false,
                quizzes: false,
                web_search_chat: false,
                bibliography_export: false,
                audio_summaries: false,
                priority_processing: false,
            },
            PlanId::Student => Self {
                flashcards: true,
                quizzes: true,
                web_search_chat: false,
                bibliography_export: false,
                audio_summaries: false,
                priority_processing: false,
            },
            PlanId::Starter => Self {
                flashcards: true,
                quizzes: true,
                web_search_chat: true,
                bibliography_export: true,
                audio_summaries: true,
                priority_processing: false,
            },
            PlanId::Pro => Self {
                flashcards: true,
                quizzes: true,
                web_search_chat: true,
                bibliography_export: true,
                audio_summaries: true,
                priority_processing: true,
            },
        }
    }

    /// Whether this plan has a specific feature.
    pub fn has(&self, feature: FeatureKey) -> bool {
        match feature {
            FeatureKey::Flashcards => self.flashcards,
            FeatureKey::Quizzes => self.quizzes,
            FeatureKey::WebSearchChat => self.web_search_chat,
            FeatureKey::BibliographyExport => self.bibliography_export,
            FeatureKey::AudioSummaries => self.audio_summaries,
            FeatureKey::PriorityProcessing => self.priority_processing,
        }
    }
}

/// Presentation metadata for one plan.
///
/// Display-only. Gating decisions must never read this record; the
/// `order` field mirrors [`PlanId::rank`] and the comparator goes through
/// the rank, not through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub display_name: &'static str,
    /// Monthly price in cents.
    pub price_cents: u32,
    pub tagline: &'static str,
    pub order: u8,
    /// UI color token.
    pub color: &'static str,
}

impl PlanInfo {
    /// Get descriptive metadata for a given plan.
    pub fn for_plan(plan: PlanId) -> Self {
        match plan {
            PlanId::Free => Self {
                display_name: "Free",
                price_cents: 0,
                tagline: "Try Deep Sight on a few videos",
                order: 0,
                color: "slate",
            },
            PlanId::Student => Self {
                display_name: "Student",
                price_cents: 499,
                tagline: "Study tools for every lecture",
                order: 1,
                color: "emerald",
            },
            PlanId::Starter => Self {
                display_name: "Starter",
                price_cents: 999,
                tagline: "Serious analysis, longer videos",
                order: 2,
                color: "indigo",
            },
            PlanId::Pro => Self {
                display_name: "Pro",
                price_cents: 1999,
                tagline: "Unlimited analyses and priority processing",
                order: 3,
                color: "amber",
            },
        }
    }
}

impl PlanId {
    /// Whether this plan grants a capability flag.
    pub fn has_feature(&self, feature: FeatureKey) -> bool {
        PlanFeatures::for_plan(*self).has(feature)
    }

    /// The ceiling for a limit key on this plan.
    pub fn limit(&self, key: LimitKey) -> Limit {
        PlanLimits::for_plan(*self).get(key)
    }

    /// Whether a limit is unlimited on this plan.
    ///
    /// Defined exactly as `limit(key) == Limit::Unlimited` (raw `-1`).
    pub fn is_unlimited(&self, key: LimitKey) -> bool {
        self.limit(key).is_unlimited()
    }

    /// Presentation metadata for this plan.
    pub fn info(&self) -> PlanInfo {
        PlanInfo::for_plan(*self)
    }

    /// String-keyed feature check for callers holding a raw key.
    ///
    /// An unrecognized key is a programming error, not a runtime
    /// condition; it resolves to `false` because this gates user-facing
    /// behavior and must fail closed.
    pub fn has_feature_key(&self, key: &str) -> bool {
        FeatureKey::from_str(key)
            .map(|f| self.has_feature(f))
            .unwrap_or(false)
    }

    /// String-keyed limit lookup. Unrecognized keys resolve to
    /// [`Limit::Disabled`] (no allowance) rather than granting access.
    pub fn limit_for_key(&self, key: &str) -> Limit {
        LimitKey::from_str(key)
            .map(|k| self.limit(k))
            .unwrap_or(Limit::Disabled)
    }
}

/// Three-way comparison of plans in tier order.
pub fn compare_plans(a: PlanId, b: PlanId) -> Ordering {
    a.rank().cmp(&b.rank())
}

/// Whether moving from `current` to `target` is strictly an upgrade.
///
/// Drives "Upgrade" CTA visibility; same plan and downgrades are `false`.
pub fn is_plan_higher(current: PlanId, target: PlanId) -> bool {
    target.rank() > current.rank()
}

/// The lowest tier that grants a feature.
///
/// Walks plans from lowest to highest. If no plan grants the feature (a
/// configuration error) this returns the highest tier so upsell UI
/// degrades to "upgrade to Pro" instead of crashing.
pub fn min_plan_for_feature(feature: FeatureKey) -> PlanId {
    PlanId::ALL
        .into_iter()
        .find(|plan| plan.has_feature(feature))
        .unwrap_or(PlanId::Pro)
}
