//! Deep Sight entitlement resolution
//!
//! Pure, side-effect-free plan-entitlement lookup for the Deep Sight
//! video-analysis product. Given a subscription plan label (in whatever
//! raw form the user record carries) and a feature or limit key, answers
//! whether it is allowed, what the ceiling is, whether it is unlimited,
//! and what the minimum plan for a feature is.
//!
//! ```
//! use deepsight_entitlements::{FeatureKey, LimitKey, PlanId};
//!
//! let plan = PlanId::normalize(Some("Premium")); // legacy Pro alias
//! assert_eq!(plan, PlanId::Pro);
//! assert!(plan.has_feature(FeatureKey::Flashcards));
//! assert!(plan.is_unlimited(LimitKey::ChatQuestionsPerVideo));
//! ```

pub mod entitlements;

pub use entitlements::*;
