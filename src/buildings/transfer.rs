//! One-unit-at-a-time movement between the player inventory and a building.

use bevy::math::Vec2;
use crate::shared::*;
use super::policy::TransferPolicy;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Looking for a unit to move this tick.
    Ready,
    /// A unit moved; waiting out the building's cooldown.
    Cooldown { remaining: f32 },
}

/// Direction of a single unit move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSide {
    Input,
    Output,
}

/// A unit that was committed to both ledgers this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTransfer {
    pub kind: ResourceKind,
    pub side: TransferSide,
}

/// Cancellable per-building transfer loop.
///
/// Ledger changes happen the moment a unit is picked; only the flight that
/// visualises it can be interrupted.
#[derive(Debug, Clone)]
pub struct TransferProcess {
    pub cooldown_secs: f32,
    phase: Phase,
    flight_remaining: f32,
}

impl TransferProcess {
    pub fn new(cooldown_secs: f32) -> Self {
        Self {
            cooldown_secs,
            phase: Phase::Idle,
            flight_remaining: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn flight_in_progress(&self) -> bool {
        self.flight_remaining > 0.0
    }

    /// Start the loop unless it is already running.
    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Ready;
        }
    }

    /// Stop the loop, dropping any pending cooldown. Returns true if a unit
    /// flight was cut short.
    pub fn cancel(&mut self) -> bool {
        let interrupted = self.flight_in_progress();
        self.phase = Phase::Idle;
        self.flight_remaining = 0.0;
        interrupted
    }

    /// Run one tick of the loop. `side` is the zone the actor stands in
    /// (input wins when both overlap). A moved unit is returned along with
    /// the status so the caller can animate it and re-check production.
    pub fn tick<P: TransferPolicy + ?Sized>(
        &mut self,
        dt: f32,
        side: TransferSide,
        policy: &P,
        stored: &mut ResourceLedger,
        player: &mut ResourceLedger,
    ) -> (RoutineStatus, Option<UnitTransfer>) {
        if self.flight_remaining > 0.0 {
            self.flight_remaining = (self.flight_remaining - dt).max(0.0);
        }

        match self.phase {
            Phase::Idle => return (RoutineStatus::Idle, None),
            Phase::Cooldown { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = Phase::Cooldown { remaining };
                    return (RoutineStatus::Suspended, None);
                }
                self.phase = Phase::Ready;
            }
            Phase::Ready => {}
        }

        if self.flight_in_progress() {
            return (RoutineStatus::Suspended, None);
        }

        let moved = match side {
            TransferSide::Input => policy
                .resource_needed(stored, player)
                .filter(|kind| player.transfer_unit(stored, kind)),
            TransferSide::Output => policy
                .resource_available(stored)
                .filter(|kind| stored.transfer_unit(player, kind)),
        };

        match moved {
            Some(kind) => {
                self.phase = Phase::Cooldown {
                    remaining: self.cooldown_secs,
                };
                (RoutineStatus::Running, Some(UnitTransfer { kind, side }))
            }
            // Nothing to move: try again next tick, no cooldown.
            None => (RoutineStatus::Suspended, None),
        }
    }

    /// Record the flight that visualises the unit just moved. The next unit
    /// waits for it to land.
    pub fn begin_flight(&mut self, duration_secs: f32) {
        self.flight_remaining = duration_secs.max(0.0);
    }
}

/// Seconds a unit takes to fly between two world points.
pub fn flight_duration(from: Vec2, to: Vec2) -> f32 {
    from.distance(to) / RESOURCE_FLY_SPEED
}
