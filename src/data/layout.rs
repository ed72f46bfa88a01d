use bevy::prelude::*;

use crate::buildings::{
    BuildingFunction, BuildingTuning, ConstructionSite, ConstructionStage, Recipe, RecipeInput,
    StorageManifest, Workshop,
};
use crate::fx::BuildingTint;
use crate::harvest::HarvestNode;
use crate::shared::*;

/// Footprint of every building, in world pixels.
const BUILDING_SIZE: Vec2 = Vec2::new(TILE_SIZE * 2.0, TILE_SIZE * 2.0);
/// Input zone sits left of the building, output zone right of it.
const SIDE_ZONE_OFFSET: Vec2 = Vec2::new(TILE_SIZE * 1.75, -TILE_SIZE * 0.25);
const SIDE_ZONE_HALF_EXTENTS: Vec2 = Vec2::new(TILE_SIZE * 0.75, TILE_SIZE);
const SITE_ZONE_HALF_EXTENTS: Vec2 = Vec2::new(TILE_SIZE * 1.75, TILE_SIZE * 1.75);
/// Where flights land on (input) or leave from (output), relative to the
/// building centre.
const DOCK_OFFSET: Vec2 = Vec2::new(TILE_SIZE * 0.6, 0.0);

#[derive(Debug, Clone)]
pub struct ConstructionPlan {
    pub stages: Vec<ConstructionStage>,
    pub hits_required: u32,
    pub hit_cooldown_secs: f32,
}

#[derive(Debug, Clone)]
pub struct BuildingBlueprint {
    /// Authored id. Authored ids keep saves portable across launches.
    pub id: Option<&'static str>,
    pub label: &'static str,
    pub position: Vec2,
    pub function: BuildingFunction,
    /// Storage contents the building starts with.
    pub initial: Vec<(&'static str, u32)>,
    pub construction: Option<ConstructionPlan>,
    pub tint: Color,
}

#[derive(Debug, Clone)]
pub struct HarvestNodeBlueprint {
    pub position: Vec2,
    pub kind: &'static str,
    pub amount: u32,
    pub hits_required: u32,
    pub hit_delay_secs: f32,
    pub radius: f32,
}

pub fn default_buildings() -> Vec<BuildingBlueprint> {
    vec![
        BuildingBlueprint {
            id: Some("sawmill"),
            label: "Sawmill",
            position: Vec2::new(-120.0, 60.0),
            function: BuildingFunction::Processing(Recipe::processing("wood", 2, "plank", 1, 3.0)),
            initial: Vec::new(),
            construction: None,
            tint: Color::srgb(0.62, 0.45, 0.28),
        },
        BuildingBlueprint {
            id: Some("brickworks"),
            label: "Brickworks",
            position: Vec2::new(0.0, 110.0),
            function: BuildingFunction::Crafting(Recipe::crafting(
                vec![RecipeInput::new("plank", 2), RecipeInput::new("stone", 1)],
                "brick",
                1,
                5.0,
            )),
            initial: Vec::new(),
            construction: None,
            tint: Color::srgb(0.7, 0.38, 0.3),
        },
        BuildingBlueprint {
            id: Some("warehouse"),
            label: "Warehouse",
            position: Vec2::new(-120.0, -60.0),
            function: BuildingFunction::Storage(StorageManifest {
                storable: ["wood", "stone", "plank", "brick", "iron_ore", "iron_bar", "tool"]
                    .into_iter()
                    .map(ResourceKind::new)
                    .collect(),
            }),
            initial: vec![("wood", 4), ("stone", 2)],
            construction: None,
            tint: Color::srgb(0.5, 0.5, 0.58),
        },
        BuildingBlueprint {
            id: Some("smelter"),
            label: "Smelter",
            position: Vec2::new(120.0, 60.0),
            function: BuildingFunction::Processing(Recipe::processing("iron_ore", 3, "iron_bar", 1, 4.0)),
            initial: Vec::new(),
            construction: Some(ConstructionPlan {
                stages: vec![ConstructionStage::new("wood", 5), ConstructionStage::new("stone", 5)],
                hits_required: 4,
                hit_cooldown_secs: 0.6,
            }),
            tint: Color::srgb(0.42, 0.4, 0.45),
        },
        BuildingBlueprint {
            id: Some("toolsmith"),
            label: "Toolsmith",
            position: Vec2::new(120.0, -60.0),
            function: BuildingFunction::Crafting(Recipe::crafting(
                vec![RecipeInput::new("iron_bar", 1), RecipeInput::new("plank", 1)],
                "tool",
                1,
                6.0,
            )),
            initial: Vec::new(),
            construction: Some(ConstructionPlan {
                stages: vec![ConstructionStage::new("brick", 4), ConstructionStage::new("plank", 3)],
                hits_required: 5,
                hit_cooldown_secs: 0.6,
            }),
            tint: Color::srgb(0.35, 0.45, 0.55),
        },
    ]
}

pub fn default_harvest_nodes() -> Vec<HarvestNodeBlueprint> {
    let tree = |x: f32, y: f32| HarvestNodeBlueprint {
        position: Vec2::new(x, y),
        kind: "wood",
        amount: 3,
        hits_required: 3,
        hit_delay_secs: 0.6,
        radius: TILE_SIZE * 1.25,
    };
    let rock = |x: f32, y: f32| HarvestNodeBlueprint {
        position: Vec2::new(x, y),
        kind: "stone",
        amount: 2,
        hits_required: 4,
        hit_delay_secs: 0.6,
        radius: TILE_SIZE * 1.25,
    };
    vec![
        tree(-220.0, 140.0),
        tree(-250.0, 90.0),
        tree(-200.0, 20.0),
        rock(220.0, 150.0),
        rock(250.0, 0.0),
        HarvestNodeBlueprint {
            position: Vec2::new(230.0, -140.0),
            kind: "iron_ore",
            amount: 2,
            hits_required: 5,
            hit_delay_secs: 0.7,
            radius: TILE_SIZE * 1.25,
        },
    ]
}

fn ledger_from(entries: &[(&'static str, u32)]) -> ResourceLedger {
    entries
        .iter()
        .map(|(name, amount)| (ResourceKind::new(*name), *amount))
        .collect()
}

/// Spawn a building and its trigger zones. Returns the building entity.
pub fn spawn_building(
    commands: &mut Commands,
    blueprint: &BuildingBlueprint,
    tuning: &BuildingTuning,
) -> Entity {
    let id = blueprint
        .id
        .map(BuildingId::new)
        .unwrap_or_else(BuildingId::generate);
    let scaffold = blueprint.tint.with_alpha(0.45);

    let mut building = commands.spawn((
        id,
        Building {
            label: blueprint.label.to_string(),
            input_point: blueprint.position - DOCK_OFFSET,
            output_point: blueprint.position + DOCK_OFFSET,
        },
        ZoneOccupancy::default(),
        BuildingTint {
            scaffold,
            built: blueprint.tint,
        },
        Sprite {
            color: scaffold,
            custom_size: Some(BUILDING_SIZE),
            ..default()
        },
        Transform::from_translation(blueprint.position.extend(Z_BUILDING)),
        Visibility::default(),
    ));

    match &blueprint.construction {
        Some(plan) => {
            building.insert(ConstructionSite::new(
                plan.stages.clone(),
                plan.hits_required,
                plan.hit_cooldown_secs,
                blueprint.function.clone(),
            ));
        }
        None => {
            building.insert(
                Workshop::new(
                    blueprint.function.clone(),
                    tuning.transfer_delay_secs,
                    tuning.zone_exit_policy,
                )
                .with_stored(ledger_from(&blueprint.initial)),
            );
        }
    }
    let owner = building.id();

    let zones = [
        (ZoneKind::Input, blueprint.position + Vec2::new(-SIDE_ZONE_OFFSET.x, SIDE_ZONE_OFFSET.y), SIDE_ZONE_HALF_EXTENTS),
        (ZoneKind::Output, blueprint.position + SIDE_ZONE_OFFSET, SIDE_ZONE_HALF_EXTENTS),
        (ZoneKind::Site, blueprint.position, SITE_ZONE_HALF_EXTENTS),
    ];
    for (kind, centre, half_extents) in zones {
        if kind == ZoneKind::Site && blueprint.construction.is_none() {
            continue;
        }
        commands.spawn((
            TriggerZone::new(owner, kind, half_extents),
            Transform::from_translation(centre.extend(Z_GROUND)),
        ));
    }

    owner
}

pub fn spawn_harvest_node(
    commands: &mut Commands,
    blueprint: &HarvestNodeBlueprint,
    catalog: &ResourceCatalog,
) -> Entity {
    let kind = ResourceKind::new(blueprint.kind);
    let color = catalog.color(&kind);

    let owner = commands
        .spawn((
            HarvestNode::new(
                kind,
                blueprint.amount,
                blueprint.hits_required,
                blueprint.hit_delay_secs,
            ),
            ZoneOccupancy::default(),
            Sprite {
                color,
                custom_size: Some(Vec2::splat(TILE_SIZE)),
                ..default()
            },
            Transform::from_translation(blueprint.position.extend(Z_BUILDING)),
            Visibility::default(),
        ))
        .id();

    commands.spawn((
        TriggerZone::new(owner, ZoneKind::Site, Vec2::splat(blueprint.radius)),
        Transform::from_translation(blueprint.position.extend(Z_GROUND)),
    ));

    owner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::populate_resources;

    #[test]
    fn test_layout_ids_are_unique_and_kinds_known() {
        let mut catalog = ResourceCatalog::default();
        populate_resources(&mut catalog);

        let buildings = default_buildings();
        let mut ids: Vec<_> = buildings.iter().filter_map(|b| b.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), buildings.len());

        for blueprint in &buildings {
            if let Some(plan) = &blueprint.construction {
                for stage in &plan.stages {
                    assert!(catalog.resolve(stage.kind.name()).is_some());
                }
            }
        }
        for node in default_harvest_nodes() {
            assert!(catalog.resolve(node.kind).is_some());
        }
    }

    #[test]
    fn test_layout_has_every_building_kind() {
        let buildings = default_buildings();
        assert!(buildings.iter().any(|b| matches!(b.function, BuildingFunction::Processing(_))));
        assert!(buildings.iter().any(|b| matches!(b.function, BuildingFunction::Crafting(_))));
        assert!(buildings.iter().any(|b| matches!(b.function, BuildingFunction::Storage(_))));
        assert!(buildings.iter().any(|b| b.construction.is_some()));
    }
}
