// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-time analytics SDK configuration.
//
// Several lifecycle hooks race to configure the SDK first (pre-launch,
// post-launch, first engine creation, an explicit call). The guard is a
// `OnceLock`, so the check-then-configure runs as one unit and every later
// trigger observes `Configured` and does nothing. Before configuring it also
// asks the SDK's own registry, because the SDK may have been configured by
// something outside this crate.

use std::sync::OnceLock;

use crate::traits::AnalyticsSdk;

/// Lifecycle entry point that attempted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitTrigger {
    WillFinishLaunching,
    DidFinishLaunching,
    EngineCreated,
    Explicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkState {
    Uninitialized,
    Configured,
}

/// Result of one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// This trigger called `configure()`.
    Configured,
    /// This trigger won the guard but the SDK was already configured elsewhere.
    AlreadyConfigured,
    /// An earlier trigger already won; nothing happened.
    NoOp,
}

/// Process-wide guard instance used by the native entry points.
pub static SDK_GUARD: SdkInitGuard = SdkInitGuard::new();

/// `Uninitialized -> Configured`, exactly once.
#[derive(Debug)]
pub struct SdkInitGuard {
    winner: OnceLock<InitTrigger>,
}

impl SdkInitGuard {
    pub const fn new() -> Self {
        Self {
            winner: OnceLock::new(),
        }
    }

    pub fn state(&self) -> SdkState {
        if self.winner.get().is_some() {
            SdkState::Configured
        } else {
            SdkState::Uninitialized
        }
    }

    /// The trigger that performed the transition, if any has.
    pub fn configured_by(&self) -> Option<InitTrigger> {
        self.winner.get().copied()
    }

    /// Configure `sdk` unless this guard has already transitioned.
    ///
    /// `sdk.configure()` must not re-enter the guard.
    pub fn ensure_configured<S: AnalyticsSdk + ?Sized>(
        &self,
        sdk: &S,
        trigger: InitTrigger,
    ) -> GuardOutcome {
        let mut outcome = GuardOutcome::NoOp;
        self.winner.get_or_init(|| {
            if sdk.is_configured() {
                outcome = GuardOutcome::AlreadyConfigured;
            } else {
                sdk.configure();
                outcome = GuardOutcome::Configured;
            }
            trigger
        });

        match outcome {
            GuardOutcome::Configured => {
                tracing::info!(?trigger, "analytics SDK configured");
            }
            GuardOutcome::AlreadyConfigured => {
                tracing::info!(?trigger, "analytics SDK was already configured externally");
            }
            GuardOutcome::NoOp => {
                tracing::debug!(?trigger, first = ?self.configured_by(), "analytics SDK guard already passed");
            }
        }
        outcome
    }
}

impl Default for SdkInitGuard {
    fn default() -> Self {
        Self::new()
    }
}
