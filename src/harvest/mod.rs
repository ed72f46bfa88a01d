//! Harvestable resource nodes: stand next to one long enough and it pays out
//! into the player inventory. Each payout is announced as `NodeHarvestedEvent`.

use bevy::prelude::*;

use crate::shared::*;

pub struct HarvestPlugin;

impl Plugin for HarvestPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            tick_harvest_nodes
                .after(ZoneSystems)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[derive(Component, Debug, Clone)]
pub struct HarvestNode {
    pub kind: ResourceKind,
    pub amount: u32,
    pub hits_required: u32,
    pub hit_delay_secs: f32,
    hits: u32,
    next_hit_in: f32,
    engaged: bool,
}

impl HarvestNode {
    pub fn new(kind: ResourceKind, amount: u32, hits_required: u32, hit_delay_secs: f32) -> Self {
        Self {
            kind,
            amount,
            hits_required: hits_required.max(1),
            hit_delay_secs,
            hits: 0,
            next_hit_in: hit_delay_secs,
            engaged: false,
        }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Share of the node still standing; this is what the bar shows.
    pub fn remaining_fraction(&self) -> f32 {
        1.0 - (self.hits as f32 / self.hits_required as f32).min(1.0)
    }

    pub fn tick(&mut self, dt: f32, occupancy: &ZoneOccupancy, fx: &mut Vec<FxRequest>) -> RoutineStatus {
        if !occupancy.is_engaged() || !occupancy.in_site {
            if self.engaged {
                self.engaged = false;
                fx.push(FxRequest::HideProgress);
            }
            return RoutineStatus::Idle;
        }
        if !self.engaged {
            self.engaged = true;
            self.next_hit_in = self.hit_delay_secs;
            fx.push(FxRequest::Progress(self.remaining_fraction()));
        }
        // The hit clock keeps running while the actor walks; only the hit
        // itself waits for them to stop.
        self.next_hit_in -= dt;
        if occupancy.is_moving || self.next_hit_in > 0.0 {
            return RoutineStatus::Suspended;
        }
        self.hits += 1;
        self.next_hit_in = self.hit_delay_secs;

        if self.hits >= self.hits_required {
            fx.push(FxRequest::HideProgress);
            return RoutineStatus::Completed;
        }
        fx.push(FxRequest::Progress(self.remaining_fraction()));
        RoutineStatus::Running
    }
}

pub fn tick_harvest_nodes(
    mut commands: Commands,
    time: Res<Time>,
    mut inventory: ResMut<PlayerInventory>,
    mut nodes: Query<(Entity, &mut HarvestNode, &ZoneOccupancy)>,
    mut fx_events: EventWriter<BuildingFxEvent>,
    mut harvested: EventWriter<NodeHarvestedEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut node, occupancy) in &mut nodes {
        let mut fx = Vec::new();
        let status = node.tick(dt, occupancy, &mut fx);
        for request in fx {
            fx_events.send(BuildingFxEvent { owner: entity, request });
        }
        if status != RoutineStatus::Completed {
            continue;
        }

        inventory.ledger.add(&node.kind, node.amount);
        info!("Harvested {} x{}", node.kind, node.amount);
        harvested.send(NodeHarvestedEvent {
            kind: node.kind.clone(),
            amount: node.amount,
        });
        commands.entity(entity).despawn();
    }
}
