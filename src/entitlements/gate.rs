//! Request gating ahead of analysis API calls
//!
//! Combines the effective plan, the static limit tables, and
//! caller-supplied usage into an allow/deny decision with a reason the
//! frontend can render directly.

use serde::{Deserialize, Serialize};

use super::types::{FeatureKey, Limit, LimitKey, PlanId, Subscription, SubscriptionStatus};

/// Gate for analysis requests and feature access.
pub struct AnalysisGate;

impl AnalysisGate {
    /// Create a new gate.
    pub fn new() -> Self {
        Self
    }

    /// Check whether a new analysis is allowed for this subscription.
    ///
    /// Returns `GateDecision::Allowed` with the remaining allowance
    /// (`None` when unlimited), or `GateDecision::Denied` with a reason
    /// and, where upgrading would help, an upgrade URL.
    pub fn check_analysis(&self, subscription: &Subscription, usage_count: u32) -> GateDecision {
        if !subscription.in_good_standing() {
            return GateDecision::Denied {
                reason: DenialReason::SubscriptionInactive {
                    status: subscription.status,
                },
                upgrade_url: Some(Self::upgrade_url()),
            };
        }

        let plan = subscription.effective_plan();
        match plan.limit(LimitKey::MonthlyAnalyses) {
            Limit::Unlimited => GateDecision::Allowed { remaining: None },
            Limit::Disabled => GateDecision::Denied {
                reason: DenialReason::FeatureDisabled {
                    required_plan: Self::min_plan_with_analyses(),
                },
                upgrade_url: Some(Self::upgrade_url()),
            },
            Limit::Bounded(max) => {
                if usage_count >= max {
                    GateDecision::Denied {
                        reason: DenialReason::PlanLimitReached {
                            limit: max,
                            used: usage_count,
                        },
                        upgrade_url: if plan == PlanId::Free {
                            Some(Self::upgrade_url())
                        } else {
                            None
                        },
                    }
                } else {
                    GateDecision::Allowed {
                        remaining: Some(max - usage_count),
                    }
                }
            }
        }
    }

    /// Check whether a capability flag is available to this subscription.
    pub fn can_use_feature(&self, subscription: &Subscription, feature: FeatureKey) -> bool {
        subscription.effective_plan().has_feature(feature)
    }

    /// Deep link handled by the frontend to open the upgrade flow.
    fn upgrade_url() -> String {
        "deepsight://upgrade".to_string()
    }

    /// Lowest tier with any analysis allowance at all.
    fn min_plan_with_analyses() -> PlanId {
        PlanId::ALL
            .into_iter()
            .find(|plan| !plan.limit(LimitKey::MonthlyAnalyses).is_disabled())
            .unwrap_or(PlanId::Pro)
    }
}

impl Default for AnalysisGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a gate check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
#[serde(tag = "type")]
pub enum GateDecision {
    #[serde(rename = "allowed")]
    Allowed {
        /// Remaining allowance, `None` when unlimited.
        remaining: Option<u32>,
    },
    #[serde(rename = "denied")]
    Denied {
        reason: DenialReason,
        upgrade_url: Option<String>,
    },
}

impl GateDecision {
    /// Check if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Get the denial reason if denied.
    pub fn denial_reason(&self) -> Option<&DenialReason> {
        match self {
            Self::Denied { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Reason for denying a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
#[serde(tag = "type")]
pub enum DenialReason {
    #[serde(rename = "planLimitReached")]
    PlanLimitReached { limit: u32, used: u32 },
    #[serde(rename = "featureDisabled")]
    FeatureDisabled { required_plan: PlanId },
    #[serde(rename = "subscriptionInactive")]
    SubscriptionInactive { status: SubscriptionStatus },
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlanLimitReached { limit, used } => {
                write!(f, "Monthly analysis limit reached: {}/{} used", used, limit)
            }
            Self::FeatureDisabled { required_plan } => {
                write!(
                    f,
                    "Not available on this plan, requires {}",
                    required_plan.info().display_name
                )
            }
            Self::SubscriptionInactive { status } => {
                write!(f, "Subscription is {:?}", status)
            }
        }
    }
}
