//! Entitlement resolution for subscription plans
//!
//! This module handles:
//! - Plan label normalization (legacy and localized names)
//! - Feature gating and numeric limit resolution per plan
//! - Plan comparison and minimum-plan-for-feature queries
//! - Upsell and low-credit threshold evaluation
//! - Allow/deny gating ahead of analysis API calls
//!
//! Everything is a pure function over static tables; unknown inputs fail
//! closed (lowest plan, no feature, no allowance) rather than erroring.

mod gate;
mod plans;
mod triggers;
mod types;

pub use gate::{AnalysisGate, DenialReason, GateDecision};
pub use plans::{
    compare_plans, is_plan_higher, min_plan_for_feature, PlanFeatures, PlanInfo, PlanLimits,
};
pub use triggers::{low_credits_alert, upgrade_prompt, CreditAlert, UpgradePrompt};
pub use types::{
    EntitlementError, FeatureKey, Limit, LimitKey, PlanId, Subscription, SubscriptionStatus,
};
