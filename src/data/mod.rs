//! Data layer: populates the resource catalog and spawns the yard.
//!
//! Runs in OnEnter(GameState::Loading), fills the `ResourceCatalog` from the
//! hard-coded content in `resources`, spawns every building and harvest node
//! described in `layout`, then transitions to GameState::Playing.

mod layout;
mod resources;

use bevy::prelude::*;
use crate::buildings::BuildingTuning;
use crate::shared::*;

pub use layout::{
    default_buildings, default_harvest_nodes, spawn_building, spawn_harvest_node,
    BuildingBlueprint, ConstructionPlan, HarvestNodeBlueprint,
};
pub use resources::populate_resources;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(
    mut commands: Commands,
    mut catalog: ResMut<ResourceCatalog>,
    tuning: Res<BuildingTuning>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: populating registries…");

    // Loading is re-entered after a save is deleted; start the catalog over.
    *catalog = ResourceCatalog::default();
    populate_resources(&mut catalog);
    info!("  Resources loaded: {}", catalog.defs.len());

    let buildings = default_buildings();
    for blueprint in &buildings {
        spawn_building(&mut commands, blueprint, &tuning);
    }
    let nodes = default_harvest_nodes();
    for blueprint in &nodes {
        spawn_harvest_node(&mut commands, blueprint, &catalog);
    }
    info!(
        "  Buildings spawned: {}, harvest nodes spawned: {}",
        buildings.len(),
        nodes.len()
    );

    next_state.set(GameState::Playing);
}
