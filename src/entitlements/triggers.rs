//! Conversion trigger evaluation
//!
//! Pure threshold checks over the static plan tables. No state is kept
//! between calls; the caller supplies current usage every time.

use serde::{Deserialize, Serialize};

use super::types::{Limit, LimitKey, PlanId};

/// Warn when this many free analyses remain before the block.
const UPGRADE_WARN_WITHIN: u32 = 1;

/// Low-credit warning threshold, percent of max remaining.
const CREDITS_WARNING_PERCENT: i64 = 25;

/// Low-credit critical threshold, percent of max remaining.
const CREDITS_CRITICAL_PERCENT: i64 = 10;

/// Severity of the upgrade prompt to show, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradePrompt {
    None,
    Warning,
    Blocked,
}

/// Severity of the low-credits alert to show, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditAlert {
    None,
    Warning,
    Critical,
}

/// Decide whether to show an upgrade prompt for the monthly analysis
/// allowance.
///
/// Only the free tier prompts; paid plans return [`UpgradePrompt::None`]
/// regardless of usage. The blocked check runs before the warning check:
/// blocked usage also exceeds the warning threshold, and evaluating in
/// the wrong order would mask the more severe state.
pub fn upgrade_prompt(plan: PlanId, usage_count: u32) -> UpgradePrompt {
    if plan != PlanId::Free {
        return UpgradePrompt::None;
    }
    match plan.limit(LimitKey::MonthlyAnalyses) {
        Limit::Unlimited => UpgradePrompt::None,
        Limit::Disabled => UpgradePrompt::Blocked,
        Limit::Bounded(max) => {
            if usage_count >= max {
                UpgradePrompt::Blocked
            } else if usage_count >= max.saturating_sub(UPGRADE_WARN_WITHIN) {
                UpgradePrompt::Warning
            } else {
                UpgradePrompt::None
            }
        }
    }
}

/// Decide whether to alert on a running-low credit balance.
///
/// `max` follows the raw limit convention: a non-positive max (unlimited
/// or disabled allowance) never alerts. Critical is checked before
/// warning for the same masking reason as [`upgrade_prompt`].
pub fn low_credits_alert(current: i64, max: i64) -> CreditAlert {
    if max <= 0 {
        return CreditAlert::None;
    }
    let remaining = current.clamp(0, max);
    if remaining * 100 <= max * CREDITS_CRITICAL_PERCENT {
        CreditAlert::Critical
    } else if remaining * 100 <= max * CREDITS_WARNING_PERCENT {
        CreditAlert::Warning
    } else {
        CreditAlert::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_tier_prompt_thresholds() {
        // Free tier allows 3 analyses: warn at 2 used, block at 3.
        assert_eq!(upgrade_prompt(PlanId::Free, 0), UpgradePrompt::None);
        assert_eq!(upgrade_prompt(PlanId::Free, 1), UpgradePrompt::None);
        assert_eq!(upgrade_prompt(PlanId::Free, 2), UpgradePrompt::Warning);
        assert_eq!(upgrade_prompt(PlanId::Free, 3), UpgradePrompt::Blocked);
        assert_eq!(upgrade_prompt(PlanId::Free, 50), UpgradePrompt::Blocked);
    }

    #[test]
    fn test_paid_plans_never_prompt() {
        for plan in [PlanId::Student, PlanId::Starter, PlanId::Pro] {
            assert_eq!(upgrade_prompt(plan, 0), UpgradePrompt::None);
            assert_eq!(upgrade_prompt(plan, 10_000), UpgradePrompt::None);
        }
    }

    #[test]
    fn test_low_credits_thresholds() {
        assert_eq!(low_credits_alert(100, 100), CreditAlert::None);
        assert_eq!(low_credits_alert(26, 100), CreditAlert::None);
        assert_eq!(low_credits_alert(25, 100), CreditAlert::Warning);
        assert_eq!(low_credits_alert(11, 100), CreditAlert::Warning);
        assert_eq!(low_credits_alert(10, 100), CreditAlert::Critical);
        assert_eq!(low_credits_alert(0, 100), CreditAlert::Critical);
    }

    #[test]
    fn test_critical_masks_warning() {
        // A balance under both thresholds reports the more severe state.
        assert_eq!(low_credits_alert(1, 100), CreditAlert::Critical);
    }

    #[test]
    fn test_unlimited_or_disabled_max_never_alerts() {
        assert_eq!(low_credits_alert(0, -1), CreditAlert::None);
        assert_eq!(low_credits_alert(0, 0), CreditAlert::None);
        assert_eq!(low_credits_alert(5, -1), CreditAlert::None);
    }

    #[test]
    fn test_negative_current_clamps_to_critical() {
        assert_eq!(low_credits_alert(-3, 100), CreditAlert::Critical);
    }
}
