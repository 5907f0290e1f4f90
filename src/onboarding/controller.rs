//! Step transition controller — persist-then-advance over the tenant store.
//!
//! Each tenant gets one in-memory session. The step pointer is seeded
//! from [`OnboardingStep::resolve`] on first load and mutated locally
//! afterwards; the remote store is only re-queried by the one-shot
//! reconcile that runs after the terminal transition.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::onboarding::flags::keys;
use crate::store::TenantStore;

use super::step::OnboardingStep;

/// Snapshot of a session for the REST surface.
#[derive(Debug, Clone, Serialize)]
pub struct StepStatus {
    pub step: OnboardingStep,
    /// Wizard position 1..=3, absent for the terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u8>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// One tenant's onboarding session.
pub struct OnboardingSession {
    tenant: String,
    store: Arc<dyn TenantStore>,
    step: Arc<RwLock<OnboardingStep>>,
    completed_at: RwLock<Option<DateTime<Utc>>>,
    reconcile_delay: Duration,
}

impl OnboardingSession {
    /// Seed a session from the persisted flags.
    pub async fn load(
        tenant: &str,
        store: Arc<dyn TenantStore>,
        reconcile_delay: Duration,
    ) -> Result<Self, StoreError> {
        let flags = store.get_flags(tenant).await?;
        let step = OnboardingStep::resolve(&flags);
        tracing::debug!(tenant, %step, "seeded onboarding session");
        Ok(Self {
            tenant: tenant.to_string(),
            store,
            step: Arc::new(RwLock::new(step)),
            completed_at: RwLock::new(None),
            reconcile_delay,
        })
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Persist the current step's flag, then advance the pointer.
    ///
    /// `from` is the step the caller was on when it submitted. A stale
    /// submission (double-click, second tab) whose `from` no longer
    /// matches the pointer is a no-op that returns the current step —
    /// the underlying write is an idempotent set, so there is nothing to
    /// undo either way. On write failure the pointer is untouched and
    /// the error is returned for the UI to surface.
    pub async fn advance(
        &self,
        from: Option<OnboardingStep>,
    ) -> Result<OnboardingStep, StoreError> {
        // Write lock held across the remote call: one in-flight advance
        // per session.
        let mut step = self.step.write().await;
        let current = *step;

        if let Some(from) = from {
            if from != current {
                tracing::debug!(
                    tenant = %self.tenant,
                    submitted = %from,
                    current = %current,
                    "ignoring stale advance"
                );
                return Ok(current);
            }
        }

        let Some(flag) = current.flag_key() else {
            // Terminal is a sink state; nothing left to advance.
            return Ok(current);
        };

        self.store.set_flag(&self.tenant, flag, "true").await?;

        // flag_key() and next() are both None only at Complete, so next
        // always exists on this path.
        let next = current.next().unwrap_or(current);
        *step = next;
        drop(step);

        if next.is_terminal() {
            self.finish().await;
        }

        tracing::info!(tenant = %self.tenant, from = %current, to = %next, "onboarding advanced");
        Ok(next)
    }

    /// Purely local back transition; no remote interaction, floor-clamped
    /// at step 1.
    pub async fn back(&self) -> OnboardingStep {
        let mut step = self.step.write().await;
        *step = step.back();
        *step
    }

    pub async fn status(&self) -> StepStatus {
        let step = *self.step.read().await;
        StepStatus {
            step,
            step_number: step.number(),
            completed: step.is_terminal(),
            completed_at: *self.completed_at.read().await,
        }
    }

    /// Re-seed the pointer from the authoritative flags.
    ///
    /// Catches the case where another tab or support staff changed a
    /// flag since the session was seeded.
    pub async fn reconcile(&self) -> Result<OnboardingStep, StoreError> {
        reseed(self.store.as_ref(), &self.tenant, &self.step).await
    }

    /// Record completion and schedule the one-shot reconcile.
    async fn finish(&self) {
        *self.completed_at.write().await = Some(Utc::now());

        // Best-effort follow-up write; the gating `billing` write already
        // succeeded, so a failure here only costs the convenience flag.
        if let Err(e) = self
            .store
            .set_flag(&self.tenant, keys::ONBOARDING_COMPLETED, "true")
            .await
        {
            tracing::warn!(tenant = %self.tenant, error = %e, "failed to mark onboarding_completed");
        }

        if !self.reconcile_delay.is_zero() {
            let store = Arc::clone(&self.store);
            let step = Arc::clone(&self.step);
            let tenant = self.tenant.clone();
            let delay = self.reconcile_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = reseed(store.as_ref(), &tenant, &step).await {
                    tracing::warn!(tenant, error = %e, "post-completion reconcile failed");
                }
            });
        }
    }
}

/// Re-run the resolver against fresh flags and adopt its answer.
async fn reseed(
    store: &dyn TenantStore,
    tenant: &str,
    step: &RwLock<OnboardingStep>,
) -> Result<OnboardingStep, StoreError> {
    let flags = store.get_flags(tenant).await?;
    let resolved = OnboardingStep::resolve(&flags);
    let mut step = step.write().await;
    if *step != resolved {
        tracing::warn!(
            tenant,
            local = %*step,
            remote = %resolved,
            "reconciling diverged onboarding step"
        );
        *step = resolved;
    }
    Ok(resolved)
}

/// Per-tenant session registry backing the REST routes.
pub struct OnboardingRegistry {
    store: Arc<dyn TenantStore>,
    reconcile_delay: Duration,
    sessions: RwLock<HashMap<String, Arc<OnboardingSession>>>,
}

impl OnboardingRegistry {
    pub fn new(store: Arc<dyn TenantStore>, reconcile_delay: Duration) -> Self {
        Self {
            store,
            reconcile_delay,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the session for a tenant, seeding it on first access.
    pub async fn session(&self, tenant: &str) -> Result<Arc<OnboardingSession>, StoreError> {
        if tenant.is_empty() {
            return Err(StoreError::MissingTenant);
        }

        if let Some(session) = self.sessions.read().await.get(tenant) {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(
            OnboardingSession::load(tenant, Arc::clone(&self.store), self.reconcile_delay).await?,
        );
        let mut sessions = self.sessions.write().await;
        // Another request may have seeded the same tenant in between.
        Ok(Arc::clone(
            sessions
                .entry(tenant.to_string())
                .or_insert_with(|| Arc::clone(&session)),
        ))
    }

    pub fn store(&self) -> &Arc<dyn TenantStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTenantStore;

    const SHOP: &str = "demo.myshopify.com";

    async fn session_with(store: Arc<MemoryTenantStore>) -> OnboardingSession {
        OnboardingSession::load(SHOP, store, Duration::ZERO)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn advance_persists_then_moves() {
        let store = Arc::new(MemoryTenantStore::new());
        let session = session_with(Arc::clone(&store)).await;

        let next = session.advance(None).await.unwrap();
        assert_eq!(next, OnboardingStep::Placement);

        let flags = store.get_flags(SHOP).await.unwrap();
        assert!(flags.is_true(keys::WIDGET_INTEGRATION));
        assert!(!flags.is_true(keys::WIDGET_PLACEMENT));
    }

    #[tokio::test]
    async fn full_walk_reaches_terminal_and_marks_completion() {
        let store = Arc::new(MemoryTenantStore::new());
        let session = session_with(Arc::clone(&store)).await;

        assert_eq!(session.advance(None).await.unwrap(), OnboardingStep::Placement);
        assert_eq!(session.advance(None).await.unwrap(), OnboardingStep::Billing);
        assert_eq!(session.advance(None).await.unwrap(), OnboardingStep::Complete);

        let flags = store.get_flags(SHOP).await.unwrap();
        for key in [
            keys::WIDGET_INTEGRATION,
            keys::WIDGET_PLACEMENT,
            keys::BILLING,
            keys::ONBOARDING_COMPLETED,
        ] {
            assert!(flags.is_true(key), "{key} should be set");
        }

        let status = session.status().await;
        assert!(status.completed);
        assert!(status.completed_at.is_some());
        assert_eq!(status.step_number, None);

        // Terminal is a sink: advancing again changes nothing.
        assert_eq!(session.advance(None).await.unwrap(), OnboardingStep::Complete);
    }

    #[tokio::test]
    async fn failed_write_leaves_pointer_unchanged() {
        let store = Arc::new(MemoryTenantStore::failing());
        let session = session_with(Arc::clone(&store)).await;

        let result = session.advance(None).await;
        assert!(matches!(result, Err(StoreError::Transport(_))));

        let status = session.status().await;
        assert_eq!(status.step, OnboardingStep::Integration);

        // The flag set must not be partially mutated.
        assert!(store.get_flags(SHOP).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_write_on_step_two_stays_on_step_two() {
        let store = Arc::new(MemoryTenantStore::failing());
        store.seed(SHOP, keys::WIDGET_INTEGRATION, "true").await;
        let session = session_with(Arc::clone(&store)).await;
        assert_eq!(session.status().await.step, OnboardingStep::Placement);

        assert!(session.advance(None).await.is_err());
        assert_eq!(session.status().await.step, OnboardingStep::Placement);

        let flags = store.get_flags(SHOP).await.unwrap();
        assert!(!flags.is_true(keys::WIDGET_PLACEMENT));
    }

    #[tokio::test]
    async fn back_from_step_one_is_local_noop() {
        let store = Arc::new(MemoryTenantStore::new());
        let session = session_with(Arc::clone(&store)).await;

        assert_eq!(session.back().await, OnboardingStep::Integration);
        assert_eq!(store.write_count(), 0, "back must not touch the store");
    }

    #[tokio::test]
    async fn back_retreats_without_clearing_flags() {
        let store = Arc::new(MemoryTenantStore::new());
        let session = session_with(Arc::clone(&store)).await;

        session.advance(None).await.unwrap();
        assert_eq!(session.back().await, OnboardingStep::Integration);

        // Flags are never deleted by this subsystem.
        let flags = store.get_flags(SHOP).await.unwrap();
        assert!(flags.is_true(keys::WIDGET_INTEGRATION));
    }

    #[tokio::test]
    async fn stale_double_submission_is_ignored() {
        let store = Arc::new(MemoryTenantStore::new());
        let session = session_with(Arc::clone(&store)).await;

        let first = session
            .advance(Some(OnboardingStep::Integration))
            .await
            .unwrap();
        assert_eq!(first, OnboardingStep::Placement);

        // Second click from the already-left step: no write, no move.
        let second = session
            .advance(Some(OnboardingStep::Integration))
            .await
            .unwrap();
        assert_eq!(second, OnboardingStep::Placement);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn session_seeds_from_persisted_flags() {
        let store = Arc::new(MemoryTenantStore::new());
        store.seed(SHOP, keys::WIDGET_INTEGRATION, "true").await;
        store.seed(SHOP, keys::WIDGET_PLACEMENT, "true").await;

        let session = session_with(store).await;
        assert_eq!(session.status().await.step, OnboardingStep::Billing);
    }

    #[tokio::test]
    async fn reconcile_adopts_remote_changes() {
        let store = Arc::new(MemoryTenantStore::new());
        let session = session_with(Arc::clone(&store)).await;
        assert_eq!(session.status().await.step, OnboardingStep::Integration);

        // Support staff flips billing behind our back.
        store.seed(SHOP, keys::BILLING, "true").await;
        assert_eq!(session.reconcile().await.unwrap(), OnboardingStep::Complete);
        assert_eq!(session.status().await.step, OnboardingStep::Complete);
    }

    #[tokio::test]
    async fn completion_schedules_a_oneshot_reconcile() {
        let store = Arc::new(MemoryTenantStore::new());
        let session = Arc::new(
            OnboardingSession::load(
                SHOP,
                Arc::clone(&store) as Arc<dyn TenantStore>,
                Duration::from_millis(50),
            )
            .await
            .unwrap(),
        );

        session.advance(None).await.unwrap();
        session.advance(None).await.unwrap();
        session.advance(None).await.unwrap();

        // Someone resets billing right after completion; the delayed
        // reconcile must pick it up.
        store.seed(SHOP, keys::BILLING, "false").await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(session.status().await.step, OnboardingStep::Billing);
    }

    #[tokio::test]
    async fn registry_reuses_sessions_and_rejects_missing_tenant() {
        let store: Arc<dyn TenantStore> = Arc::new(MemoryTenantStore::new());
        let registry = OnboardingRegistry::new(store, Duration::ZERO);

        let a = registry.session(SHOP).await.unwrap();
        let b = registry.session(SHOP).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        assert!(matches!(
            registry.session("").await,
            Err(StoreError::MissingTenant)
        ));
    }
}
