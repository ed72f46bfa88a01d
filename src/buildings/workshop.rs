//! Operational buildings: one ledger, one transfer loop, one production run.

use bevy::prelude::*;

use crate::shared::*;
use super::policy::{BuildingFunction, TransferPolicy};
use super::production::{ProductionRun, ZoneExitPolicy};
use super::transfer::{flight_duration, TransferProcess, TransferSide, UnitTransfer};

/// Outcome of one workshop tick, mostly for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkshopTick {
    pub transfer: RoutineStatus,
    pub moved: Option<UnitTransfer>,
    pub production: RoutineStatus,
}

impl WorkshopTick {
    fn idle() -> Self {
        Self {
            transfer: RoutineStatus::Idle,
            moved: None,
            production: RoutineStatus::Idle,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Workshop {
    pub function: BuildingFunction,
    pub stored: ResourceLedger,
    pub transfer: TransferProcess,
    pub production: ProductionRun,
    pub exit_policy: ZoneExitPolicy,
}

impl Workshop {
    pub fn new(function: BuildingFunction, transfer_delay_secs: f32, exit_policy: ZoneExitPolicy) -> Self {
        Self {
            function,
            stored: ResourceLedger::new(),
            transfer: TransferProcess::new(transfer_delay_secs),
            production: ProductionRun::Idle,
            exit_policy,
        }
    }

    pub fn with_stored(mut self, stored: ResourceLedger) -> Self {
        self.stored = stored;
        self
    }

    /// Replace the ledger wholesale (save restore). A run whose inputs are no
    /// longer there is dropped.
    pub fn replace_stored(&mut self, stored: ResourceLedger) {
        self.stored = stored;
        if self.production.is_running() && !self.function.on_production_ready(&self.stored) {
            self.production.cancel();
        }
    }

    /// The actor left every zone of this building.
    pub fn on_actor_left(&mut self, fx: &mut Vec<FxRequest>) {
        if self.transfer.cancel() {
            fx.push(FxRequest::CancelFlight);
        }
        fx.push(FxRequest::HideProgress);
        if self.exit_policy == ZoneExitPolicy::DiscardProgress && self.production.is_running() {
            debug!("{} run discarded on zone exit", self.function.verb());
            self.production.cancel();
        }
    }

    /// Advance the building by `dt` seconds.
    ///
    /// Order within a tick: movement gate, then one transfer cycle (which
    /// re-checks production), then the production timer.
    pub fn tick(
        &mut self,
        dt: f32,
        occupancy: &ZoneOccupancy,
        actor_position: Vec2,
        building: &Building,
        player: &mut ResourceLedger,
        fx: &mut Vec<FxRequest>,
    ) -> WorkshopTick {
        if !occupancy.is_engaged() {
            return WorkshopTick::idle();
        }

        if occupancy.is_moving {
            if self.transfer.is_active() {
                if self.transfer.cancel() {
                    fx.push(FxRequest::CancelFlight);
                }
                fx.push(FxRequest::HideProgress);
            }
            let production = self.production.advance(dt, true, &self.function, &mut self.stored);
            return WorkshopTick {
                transfer: RoutineStatus::Idle,
                moved: None,
                production,
            };
        }

        let side = if occupancy.in_input {
            TransferSide::Input
        } else if occupancy.in_output {
            TransferSide::Output
        } else {
            return WorkshopTick::idle();
        };

        self.transfer.start();
        let (transfer, moved) = self.transfer.tick(dt, side, &self.function, &mut self.stored, player);

        if let Some(unit) = &moved {
            let carry = actor_position + ACTOR_CARRY_OFFSET;
            let (from, to) = match unit.side {
                TransferSide::Input => (carry, building.input_point),
                TransferSide::Output => (building.output_point, carry),
            };
            let duration_secs = flight_duration(from, to);
            self.transfer.begin_flight(duration_secs);
            fx.push(FxRequest::FlyResource {
                kind: unit.kind.clone(),
                from,
                to,
                duration_secs,
            });
            debug!(
                "{}: moved 1 {} ({:?}), stored now {}",
                building.label,
                unit.kind,
                unit.side,
                self.stored.count(&unit.kind)
            );
        }

        if transfer != RoutineStatus::Idle && self.production.try_start(&self.function, &self.stored) {
            info!("{}: {} started", building.label, self.function.verb());
            fx.push(FxRequest::Progress(0.0));
        }

        let production = self.production.advance(dt, false, &self.function, &mut self.stored);
        match production {
            RoutineStatus::Running => {
                fx.push(FxRequest::Progress(self.production.progress(&self.function)));
            }
            RoutineStatus::Completed => {
                info!("{}: {} finished", building.label, self.function.verb());
                fx.push(FxRequest::HideProgress);
            }
            _ => {}
        }

        WorkshopTick {
            transfer,
            moved,
            production,
        }
    }
}
