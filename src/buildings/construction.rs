//! Construction sites: deposit every stage's resources, then hammer the
//! required number of hits. Turns a site operational exactly once.

use bevy::prelude::*;

use crate::shared::*;
use super::policy::BuildingFunction;
use super::transfer::flight_duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionStage {
    pub kind: ResourceKind,
    pub required: u32,
    pub transfer_delay_secs: f32,
}

impl ConstructionStage {
    pub fn new(kind: impl Into<ResourceKind>, required: u32) -> Self {
        Self {
            kind: kind.into(),
            required,
            transfer_delay_secs: DEFAULT_TRANSFER_DELAY_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SiteRoutine {
    Idle,
    Depositing { wait: f32 },
    Hitting { wait: f32 },
}

#[derive(Component, Debug, Clone)]
pub struct ConstructionSite {
    pub stages: Vec<ConstructionStage>,
    pub hits_required: u32,
    pub hit_cooldown_secs: f32,
    /// Function the building gains once construction completes.
    pub function: BuildingFunction,
    deposited: ResourceLedger,
    hits: u32,
    routine: SiteRoutine,
    flight_remaining: f32,
    complete: bool,
}

impl ConstructionSite {
    pub fn new(
        stages: Vec<ConstructionStage>,
        hits_required: u32,
        hit_cooldown_secs: f32,
        function: BuildingFunction,
    ) -> Self {
        Self {
            stages,
            hits_required,
            hit_cooldown_secs,
            function,
            deposited: ResourceLedger::new(),
            hits: 0,
            routine: SiteRoutine::Idle,
            flight_remaining: 0.0,
            complete: false,
        }
    }

    pub fn deposited(&self) -> &ResourceLedger {
        &self.deposited
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_active(&self) -> bool {
        self.routine != SiteRoutine::Idle
    }

    pub fn all_deposited(&self) -> bool {
        self.stages
            .iter()
            .all(|stage| self.deposited.count(&stage.kind) >= stage.required)
    }

    /// Share of all stage resources delivered so far.
    pub fn deposit_progress(&self) -> f32 {
        let required: u32 = self.stages.iter().map(|s| s.required).sum();
        if required == 0 {
            return 1.0;
        }
        let delivered: u32 = self
            .stages
            .iter()
            .map(|s| self.deposited.count(&s.kind).min(s.required))
            .sum();
        delivered as f32 / required as f32
    }

    pub fn hit_progress(&self) -> f32 {
        if self.hits_required == 0 {
            return 1.0;
        }
        (self.hits as f32 / self.hits_required as f32).min(1.0)
    }

    /// Restore persisted deposits and hits. Kinds that are not a stage of
    /// this site are skipped and returned so the caller can report them.
    pub fn restore(&mut self, deposits: ResourceLedger, hits: u32) -> Vec<ResourceKind> {
        let mut skipped = Vec::new();
        self.deposited.clear();
        for (kind, amount) in deposits.positive() {
            if self.stages.iter().any(|stage| &stage.kind == kind) {
                self.deposited.set(kind.clone(), amount);
            } else {
                skipped.push(kind.clone());
            }
        }
        self.hits = hits.min(self.hits_required);
        self.routine = SiteRoutine::Idle;
        skipped
    }

    /// Mark the site finished without running the pipeline (save restore).
    /// Returns false if it was already complete.
    pub fn mark_complete(&mut self) -> bool {
        if self.complete {
            return false;
        }
        self.complete = true;
        self.routine = SiteRoutine::Idle;
        true
    }

    /// Stop the current phase. Deposits and hits are kept.
    pub fn cancel(&mut self, fx: &mut Vec<FxRequest>) {
        if self.flight_remaining > 0.0 {
            fx.push(FxRequest::CancelFlight);
        }
        self.flight_remaining = 0.0;
        self.routine = SiteRoutine::Idle;
    }

    /// Advance the pipeline. Returns `Completed` on the tick the site turns
    /// operational and `Idle` on every tick after that.
    pub fn tick(
        &mut self,
        dt: f32,
        occupancy: &ZoneOccupancy,
        actor_position: Vec2,
        target: Vec2,
        player: &mut ResourceLedger,
        fx: &mut Vec<FxRequest>,
    ) -> RoutineStatus {
        if self.complete || !occupancy.is_engaged() || !occupancy.in_site {
            return RoutineStatus::Idle;
        }
        if occupancy.is_moving {
            if self.is_active() {
                self.cancel(fx);
            }
            return RoutineStatus::Suspended;
        }

        self.flight_remaining = (self.flight_remaining - dt).max(0.0);

        if self.routine == SiteRoutine::Idle {
            self.routine = if self.all_deposited() {
                fx.push(FxRequest::Progress(self.hit_progress()));
                SiteRoutine::Hitting { wait: 0.0 }
            } else {
                fx.push(FxRequest::Progress(self.deposit_progress()));
                SiteRoutine::Depositing { wait: 0.0 }
            };
        }

        if let SiteRoutine::Depositing { wait } = self.routine {
            let wait = wait - dt;
            if wait > 0.0 {
                self.routine = SiteRoutine::Depositing { wait };
                return RoutineStatus::Suspended;
            }
            if !self.all_deposited() {
                self.routine = SiteRoutine::Depositing { wait: 0.0 };
                return self.deposit_one(actor_position, target, player, fx);
            }
            // Last delivery landed: hammering starts this same tick.
            fx.push(FxRequest::Progress(self.hit_progress()));
            self.routine = SiteRoutine::Hitting { wait: 0.0 };
        }

        let SiteRoutine::Hitting { wait } = self.routine else {
            return RoutineStatus::Suspended;
        };
        let wait = wait - dt;
        if wait > 0.0 {
            self.routine = SiteRoutine::Hitting { wait };
            return RoutineStatus::Suspended;
        }
        if self.hits < self.hits_required {
            self.hits += 1;
            fx.push(FxRequest::Progress(self.hit_progress()));
            self.routine = SiteRoutine::Hitting {
                wait: self.hit_cooldown_secs,
            };
            return RoutineStatus::Running;
        }

        self.complete = true;
        self.routine = SiteRoutine::Idle;
        fx.push(FxRequest::HideProgress);
        RoutineStatus::Completed
    }

    fn deposit_one(
        &mut self,
        actor_position: Vec2,
        target: Vec2,
        player: &mut ResourceLedger,
        fx: &mut Vec<FxRequest>,
    ) -> RoutineStatus {
        let stage = self.stages.iter().find(|stage| {
            self.deposited.count(&stage.kind) < stage.required && player.count(&stage.kind) > 0
        });
        let Some(stage) = stage.cloned() else {
            return RoutineStatus::Suspended;
        };
        if !player.transfer_unit(&mut self.deposited, &stage.kind) {
            return RoutineStatus::Suspended;
        }

        let from = actor_position + ACTOR_CARRY_OFFSET;
        let duration_secs = flight_duration(from, target);
        self.flight_remaining = duration_secs;
        self.routine = SiteRoutine::Depositing {
            wait: duration_secs + stage.transfer_delay_secs,
        };
        fx.push(FxRequest::FlyResource {
            kind: stage.kind.clone(),
            from,
            to: target,
            duration_secs,
        });
        fx.push(FxRequest::Progress(self.deposit_progress()));
        debug!(
            "Deposited 1 {} ({}/{})",
            stage.kind,
            self.deposited.count(&stage.kind),
            stage.required
        );
        RoutineStatus::Running
    }
}
