use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

mod construction;
mod policy;
mod production;
mod transfer;
mod workshop;
mod zones;

pub use construction::{ConstructionSite, ConstructionStage};
pub use policy::{BuildingFunction, Recipe, RecipeInput, StorageManifest, TransferPolicy};
pub use production::{ProductionRun, ZoneExitPolicy};
pub use transfer::{flight_duration, TransferProcess, TransferSide, UnitTransfer};
pub use workshop::{Workshop, WorkshopTick};
pub use zones::{apply_zone_events, detect_zone_transitions, sample_actor_movement};

/// Runtime tuning shared by every building.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct BuildingTuning {
    /// Cooldown after each unit transfer, in seconds.
    pub transfer_delay_secs: f32,
    pub zone_exit_policy: ZoneExitPolicy,
}

impl Default for BuildingTuning {
    fn default() -> Self {
        Self {
            transfer_delay_secs: DEFAULT_TRANSFER_DELAY_SECS,
            zone_exit_policy: ZoneExitPolicy::default(),
        }
    }
}

pub struct BuildingsPlugin;

impl Plugin for BuildingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildingTuning>()
            .add_systems(
                Update,
                (detect_zone_transitions, apply_zone_events, sample_actor_movement)
                    .chain()
                    .in_set(ZoneSystems)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (tick_workshops, tick_construction_sites)
                    .chain()
                    .after(ZoneSystems)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Drive every operational building one frame forward.
pub fn tick_workshops(
    time: Res<Time>,
    mut inventory: ResMut<PlayerInventory>,
    mut workshops: Query<(Entity, &Building, &mut Workshop, &ZoneOccupancy)>,
    actors: Query<&Transform>,
    mut fx_events: EventWriter<BuildingFxEvent>,
) {
    let dt = time.delta_secs();
    let mut player_changed = false;

    for (entity, building, mut workshop, occupancy) in &mut workshops {
        if !occupancy.is_engaged() {
            continue;
        }
        let actor_position = occupancy
            .actor
            .and_then(|actor| actors.get(actor).ok())
            .map(|tf| tf.translation.truncate())
            .unwrap_or(occupancy.last_position());

        let mut fx = Vec::new();
        let ledger = &mut inventory.bypass_change_detection().ledger;
        let result = workshop.tick(dt, occupancy, actor_position, building, ledger, &mut fx);
        player_changed |= result.moved.is_some();

        for request in fx {
            fx_events.send(BuildingFxEvent {
                owner: entity,
                request,
            });
        }
    }

    if player_changed {
        inventory.set_changed();
    }
}

/// Drive every pending construction site and turn finished ones operational.
#[allow(clippy::too_many_arguments)]
pub fn tick_construction_sites(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<BuildingTuning>,
    mut inventory: ResMut<PlayerInventory>,
    mut sites: Query<(Entity, &BuildingId, &Building, &Transform, &mut ConstructionSite, &ZoneOccupancy)>,
    actors: Query<&Transform>,
    mut fx_events: EventWriter<BuildingFxEvent>,
    mut completed: EventWriter<ConstructionCompletedEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    let dt = time.delta_secs();
    let mut player_changed = false;

    for (entity, id, building, transform, mut site, occupancy) in &mut sites {
        if !occupancy.is_engaged() {
            continue;
        }
        let actor_position = occupancy
            .actor
            .and_then(|actor| actors.get(actor).ok())
            .map(|tf| tf.translation.truncate())
            .unwrap_or(occupancy.last_position());

        let mut fx = Vec::new();
        let ledger = &mut inventory.bypass_change_detection().ledger;
        let before = ledger.total();
        let status = site.tick(
            dt,
            occupancy,
            actor_position,
            transform.translation.truncate(),
            ledger,
            &mut fx,
        );
        player_changed |= ledger.total() != before;

        for request in fx {
            fx_events.send(BuildingFxEvent {
                owner: entity,
                request,
            });
        }

        if status == RoutineStatus::Completed {
            info!("{} construction completed ({})", building.label, id);
            activate_building(&mut commands, entity, &site, &tuning);
            completed.send(ConstructionCompletedEvent {
                building: entity,
                building_id: id.clone(),
            });
            toasts.send(ToastEvent {
                message: format!("{} is ready", building.label),
                duration_secs: 2.5,
            });
        }
    }

    if player_changed {
        inventory.set_changed();
    }
}

/// Swap a finished site for its operational workshop. The site zone goes
/// dead and the input/output zones go live on the next detection pass.
pub fn activate_building(
    commands: &mut Commands,
    entity: Entity,
    site: &ConstructionSite,
    tuning: &BuildingTuning,
) {
    commands
        .entity(entity)
        .remove::<ConstructionSite>()
        .insert(Workshop::new(
            site.function.clone(),
            tuning.transfer_delay_secs,
            tuning.zone_exit_policy,
        ));
}
