//! Onboarding step state machine.
//!
//! The step is never stored directly; it is derived from the persisted
//! flags by [`OnboardingStep::resolve`]. Progression is linear:
//! Integration → Placement → Billing → Complete.

use serde::{Deserialize, Serialize};

use super::flags::{TenantFlags, keys};

/// One screen of the onboarding wizard, plus the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    /// Step 1 — enable the app embed in the theme editor.
    Integration,
    /// Step 2 — place the widget block on the product page.
    Placement,
    /// Step 3 — pick a billing plan.
    Billing,
    /// Terminal: setup finished. Not a numbered step.
    Complete,
}

impl OnboardingStep {
    /// Derive the step to display from the persisted flags.
    ///
    /// Pure and idempotent: the same flag set always yields the same
    /// step, and nothing is mutated. Flags can be toggled out of order
    /// externally (e.g. by support staff), so precedence matters —
    /// `billing` short-circuits everything else.
    pub fn resolve(flags: &TenantFlags) -> Self {
        if flags.is_true(keys::BILLING) {
            Self::Complete
        } else if flags.is_true(keys::WIDGET_INTEGRATION) && flags.is_true(keys::WIDGET_PLACEMENT)
        {
            Self::Billing
        } else if flags.is_true(keys::WIDGET_INTEGRATION) {
            Self::Placement
        } else {
            Self::Integration
        }
    }

    /// The flag this step's continue-action persists.
    pub fn flag_key(&self) -> Option<&'static str> {
        match self {
            Self::Integration => Some(keys::WIDGET_INTEGRATION),
            Self::Placement => Some(keys::WIDGET_PLACEMENT),
            Self::Billing => Some(keys::BILLING),
            Self::Complete => None,
        }
    }

    /// Next step in the linear progression, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Integration => Some(Self::Placement),
            Self::Placement => Some(Self::Billing),
            Self::Billing => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Previous step, floor-clamped: backing out of step 1 stays at
    /// step 1, and the terminal state has no back transition.
    pub fn back(&self) -> Self {
        match self {
            Self::Integration => Self::Integration,
            Self::Placement => Self::Integration,
            Self::Billing => Self::Placement,
            Self::Complete => Self::Complete,
        }
    }

    /// Whether onboarding is done.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Wizard step number (1..=3), `None` for the terminal state.
    pub fn number(&self) -> Option<u8> {
        match self {
            Self::Integration => Some(1),
            Self::Placement => Some(2),
            Self::Billing => Some(3),
            Self::Complete => None,
        }
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Integration
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Integration => "integration",
            Self::Placement => "placement",
            Self::Billing => "billing",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(pairs: &[(&str, &str)]) -> TenantFlags {
        let mut flags = TenantFlags::new();
        for (key, value) in pairs {
            flags.set(*key, *value);
        }
        flags
    }

    #[test]
    fn empty_flags_resolve_to_step_one() {
        assert_eq!(
            OnboardingStep::resolve(&TenantFlags::new()),
            OnboardingStep::Integration
        );
    }

    #[test]
    fn integration_alone_resolves_to_step_two() {
        let flags = flags(&[(keys::WIDGET_INTEGRATION, "true")]);
        assert_eq!(OnboardingStep::resolve(&flags), OnboardingStep::Placement);
    }

    #[test]
    fn integration_and_placement_resolve_to_step_three() {
        let flags = flags(&[
            (keys::WIDGET_INTEGRATION, "true"),
            (keys::WIDGET_PLACEMENT, "true"),
        ]);
        assert_eq!(OnboardingStep::resolve(&flags), OnboardingStep::Billing);
    }

    #[test]
    fn billing_short_circuits_everything() {
        let flags = flags(&[(keys::BILLING, "true"), (keys::WIDGET_INTEGRATION, "false")]);
        assert_eq!(OnboardingStep::resolve(&flags), OnboardingStep::Complete);
    }

    #[test]
    fn placement_without_integration_stays_at_step_one() {
        // Out-of-order completion: placement alone does not skip ahead.
        let flags = flags(&[(keys::WIDGET_PLACEMENT, "true")]);
        assert_eq!(
            OnboardingStep::resolve(&flags),
            OnboardingStep::Integration
        );
    }

    #[test]
    fn wrong_case_true_is_false() {
        let flags = flags(&[(keys::WIDGET_INTEGRATION, "TRUE")]);
        assert_eq!(
            OnboardingStep::resolve(&flags),
            OnboardingStep::Integration
        );
    }

    #[test]
    fn resolve_is_deterministic() {
        let flags = flags(&[(keys::WIDGET_INTEGRATION, "true")]);
        let first = OnboardingStep::resolve(&flags);
        let second = OnboardingStep::resolve(&flags);
        assert_eq!(first, second);
    }

    #[test]
    fn next_walks_the_wizard() {
        let mut step = OnboardingStep::Integration;
        for expected in [
            OnboardingStep::Placement,
            OnboardingStep::Billing,
            OnboardingStep::Complete,
        ] {
            step = step.next().unwrap();
            assert_eq!(step, expected);
        }
        assert!(step.next().is_none());
    }

    #[test]
    fn back_is_floor_clamped() {
        assert_eq!(
            OnboardingStep::Integration.back(),
            OnboardingStep::Integration
        );
        assert_eq!(OnboardingStep::Placement.back(), OnboardingStep::Integration);
        assert_eq!(OnboardingStep::Billing.back(), OnboardingStep::Placement);
    }

    #[test]
    fn flag_keys_match_steps() {
        assert_eq!(
            OnboardingStep::Integration.flag_key(),
            Some(keys::WIDGET_INTEGRATION)
        );
        assert_eq!(
            OnboardingStep::Placement.flag_key(),
            Some(keys::WIDGET_PLACEMENT)
        );
        assert_eq!(OnboardingStep::Billing.flag_key(), Some(keys::BILLING));
        assert_eq!(OnboardingStep::Complete.flag_key(), None);
    }

    #[test]
    fn numbers_and_terminal() {
        assert_eq!(OnboardingStep::Integration.number(), Some(1));
        assert_eq!(OnboardingStep::Billing.number(), Some(3));
        assert_eq!(OnboardingStep::Complete.number(), None);
        assert!(OnboardingStep::Complete.is_terminal());
        assert!(!OnboardingStep::Billing.is_terminal());
    }
}
