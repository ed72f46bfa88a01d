//! Timed production runs (processing and crafting).

use serde::{Deserialize, Serialize};

use crate::shared::*;
use super::policy::TransferPolicy;

/// What leaving every zone does to a production run in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZoneExitPolicy {
    /// The run is cancelled and its timer thrown away.
    #[default]
    DiscardProgress,
    /// The run stays armed and resumes from its timer on the next visit,
    /// exactly like a pause caused by movement.
    PauseProgress,
}

/// `Idle` or `Running { elapsed }`; at most one run per building.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ProductionRun {
    #[default]
    Idle,
    Running { elapsed: f32 },
}

impl ProductionRun {
    pub fn is_running(&self) -> bool {
        matches!(self, ProductionRun::Running { .. })
    }

    /// Enter `Running` if the policy says the inputs are in and no run is
    /// active. Returns true when a new run started.
    pub fn try_start<P: TransferPolicy + ?Sized>(&mut self, policy: &P, stored: &ResourceLedger) -> bool {
        if self.is_running() || !policy.on_production_ready(stored) {
            return false;
        }
        *self = ProductionRun::Running { elapsed: 0.0 };
        true
    }

    /// Accumulate `dt` unless the actor is moving (paused, never reset).
    /// When the timer reaches the policy's duration the run's ledger change
    /// is applied in one step and `Completed` is returned.
    pub fn advance<P: TransferPolicy + ?Sized>(
        &mut self,
        dt: f32,
        actor_moving: bool,
        policy: &P,
        stored: &mut ResourceLedger,
    ) -> RoutineStatus {
        let ProductionRun::Running { elapsed } = *self else {
            return RoutineStatus::Idle;
        };
        if actor_moving {
            return RoutineStatus::Suspended;
        }

        let duration = policy.production_secs();
        let elapsed = (elapsed + dt).min(duration);
        if elapsed < duration {
            *self = ProductionRun::Running { elapsed };
            return RoutineStatus::Running;
        }

        *self = ProductionRun::Idle;
        if policy.finish_production(stored) {
            RoutineStatus::Completed
        } else {
            // Inputs vanished under the run (e.g. a load replaced the ledger).
            RoutineStatus::Idle
        }
    }

    /// Fraction of the run done, 0 when idle.
    pub fn progress<P: TransferPolicy + ?Sized>(&self, policy: &P) -> f32 {
        match self {
            ProductionRun::Idle => 0.0,
            ProductionRun::Running { elapsed } => {
                let duration = policy.production_secs();
                if duration <= 0.0 {
                    1.0
                } else {
                    (elapsed / duration).clamp(0.0, 1.0)
                }
            }
        }
    }

    pub fn cancel(&mut self) {
        *self = ProductionRun::Idle;
    }
}
