//! Onboarding wizard core — flag model, step resolver, and the
//! persist-then-advance transition controller.
//!
//! The step is derived, never stored: the persisted flags are the source
//! of truth and [`step::OnboardingStep::resolve`] maps them to a step on
//! every fresh load. The in-memory session only carries the pointer
//! between loads.

pub mod controller;
pub mod flags;
pub mod step;

pub use controller::{OnboardingRegistry, OnboardingSession, StepStatus};
pub use flags::TenantFlags;
pub use step::OnboardingStep;
