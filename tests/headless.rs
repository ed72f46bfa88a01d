//! Headless integration tests for Forgeyard.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register only the
//! pure-logic plugins (skipping input, rendering and UI), place the player
//! by hand, and verify that the building loops behave end to end.
//!
//! Run with: `cargo test --test headless`

use std::path::PathBuf;
use std::time::Duration;

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use forgeyard::buildings::{
    BuildingFunction, BuildingTuning, BuildingsPlugin, ConstructionSite, ConstructionStage, Recipe,
    RecipeInput, StorageManifest, Workshop,
};
use forgeyard::data::{
    populate_resources, spawn_building, spawn_harvest_node, BuildingBlueprint, ConstructionPlan,
    DataPlugin, HarvestNodeBlueprint,
};
use forgeyard::fx::FxPlugin;
use forgeyard::harvest::{HarvestNode, HarvestPlugin};
use forgeyard::player::PlayerPlugin;
use forgeyard::save::{
    read_save, write_save, BuildingSaveData, DeleteSaveEvent, GameSaveData, LoadCompleteEvent,
    ResourceSaveData, SaveCompleteEvent, SaveConfig, SavePlugin, SaveRequestEvent, SAVE_VERSION,
};
use forgeyard::shared::*;

/// Fixed frame length for every test app.
const FRAME: Duration = Duration::from_millis(125);

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

fn temp_save_config(tag: &str) -> SaveConfig {
    let directory: PathBuf = std::env::temp_dir().join(format!(
        "forgeyard-headless-{}-{}",
        tag,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&directory);
    SaveConfig {
        directory,
        file_name: "game_save.json".to_string(),
    }
}

/// Builds a minimal Bevy app with all shared resources and events registered
/// plus the building, harvest and save plugins, but NO rendering, windowing,
/// or hardware input. The save file lives in a per-test temp directory.
fn build_test_app(tag: &str) -> App {
    build_test_app_with_frame(tag, FRAME)
}

/// Same as `build_test_app` with a custom fixed frame length.
fn build_test_app_with_frame(tag: &str, frame: Duration) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(frame));

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    app.init_resource::<PlayerInventory>()
        .init_resource::<ResourceCatalog>()
        .init_resource::<PlayerInput>();
    populate_resources(&mut app.world_mut().resource_mut::<ResourceCatalog>());
    for name in ["A", "B", "C"] {
        app.world_mut()
            .resource_mut::<ResourceCatalog>()
            .register(name, name, Color::WHITE);
    }

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<ZoneEvent>()
        .add_event::<BuildingFxEvent>()
        .add_event::<ConstructionCompletedEvent>()
        .add_event::<NodeHarvestedEvent>()
        .add_event::<ToastEvent>();

    // ── Logic plugins ────────────────────────────────────────────────────
    app.insert_resource(temp_save_config(tag));
    app.add_plugins((BuildingsPlugin, HarvestPlugin, SavePlugin));

    app
}

/// Transitions the test app to Playing state and ticks once to process it.
fn enter_playing_state(app: &mut App) {
    app.update(); // enter Loading
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update(); // process state transition
}

fn k(name: &str) -> ResourceKind {
    ResourceKind::new(name)
}

fn blueprint(id: &'static str, position: Vec2, function: BuildingFunction) -> BuildingBlueprint {
    BuildingBlueprint {
        id: Some(id),
        label: id,
        position,
        function,
        initial: Vec::new(),
        construction: None,
        tint: Color::WHITE,
    }
}

fn storage() -> BuildingFunction {
    BuildingFunction::Storage(StorageManifest {
        storable: vec![k("wood"), k("stone"), k("A"), k("B"), k("C")],
    })
}

fn spawn_blueprint(app: &mut App, blueprint: &BuildingBlueprint) -> Entity {
    let tuning = BuildingTuning::default();
    let world = app.world_mut();
    let entity = {
        let mut commands = world.commands();
        spawn_building(&mut commands, blueprint, &tuning)
    };
    world.flush();
    entity
}

fn spawn_player(app: &mut App, position: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Player,
            PlayerMovement::default(),
            Transform::from_translation(position.extend(Z_PLAYER)),
        ))
        .id()
}

fn move_player(app: &mut App, player: Entity, position: Vec2) {
    let mut transform = app.world_mut().get_mut::<Transform>(player).unwrap();
    transform.translation.x = position.x;
    transform.translation.y = position.y;
}

fn give_player(app: &mut App, entries: &[(&str, u32)]) {
    let mut inventory = app.world_mut().resource_mut::<PlayerInventory>();
    for (name, amount) in entries {
        inventory.ledger.add(&k(name), *amount);
    }
}

fn player_count(app: &App, name: &str) -> u32 {
    app.world().resource::<PlayerInventory>().ledger.count(&k(name))
}

/// World centre of the owner's zone of the given kind.
fn zone_centre(app: &mut App, owner: Entity, kind: ZoneKind) -> Vec2 {
    let mut query = app.world_mut().query::<(&TriggerZone, &Transform)>();
    query
        .iter(app.world())
        .find(|(zone, _)| zone.owner == owner && zone.kind == kind)
        .map(|(_, tf)| tf.translation.truncate())
        .unwrap()
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot: the default yard loads and reaches Playing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_smoke_transitions_and_ticks() {
    let mut app = build_test_app("boot");
    app.add_plugins((DataPlugin, PlayerPlugin, FxPlugin));

    // First update enters Loading and spawns the yard; second applies NextState.
    app.update();
    app.update();

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(state.get(), &GameState::Playing);

    let mut sites = app.world_mut().query::<&ConstructionSite>();
    let mut workshops = app.world_mut().query::<&Workshop>();
    let mut players = app.world_mut().query::<&Player>();
    assert_eq!(sites.iter(app.world()).count(), 2);
    assert_eq!(workshops.iter(app.world()).count(), 3);
    assert_eq!(players.iter(app.world()).count(), 1);

    run_frames(&mut app, 60);
    assert_eq!(
        app.world().resource::<State<GameState>>().get(),
        &GameState::Playing
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Crafting: deliver inputs, wait for the run, pick up the output
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_crafting_building_consumes_inputs_and_pays_out() {
    let mut app = build_test_app("crafting");
    let recipe = Recipe::crafting(vec![RecipeInput::new("A", 2), RecipeInput::new("B", 1)], "C", 1, 1.0);
    let building = spawn_blueprint(
        &mut app,
        &blueprint("forge", Vec2::new(200.0, 0.0), BuildingFunction::Crafting(recipe)),
    );
    let player = spawn_player(&mut app, Vec2::new(-200.0, 0.0));
    give_player(&mut app, &[("A", 2), ("B", 1)]);
    enter_playing_state(&mut app);

    let input = zone_centre(&mut app, building, ZoneKind::Input);
    move_player(&mut app, player, input);
    run_frames(&mut app, 60);

    let workshop = app.world().get::<Workshop>(building).unwrap();
    let expected: ResourceLedger = [(k("C"), 1)].into_iter().collect();
    assert_eq!(workshop.stored, expected, "inputs consumed, one output stored");
    assert_eq!(player_count(&app, "A"), 0);
    assert_eq!(player_count(&app, "B"), 0);

    let output = zone_centre(&mut app, building, ZoneKind::Output);
    move_player(&mut app, player, output);
    run_frames(&mut app, 20);

    assert_eq!(player_count(&app, "C"), 1);
    let workshop = app.world().get::<Workshop>(building).unwrap();
    assert!(workshop.stored.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Movement: walking inside a zone interrupts the flight, never the ledgers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_moving_in_zone_cancels_flight_but_keeps_moved_unit() {
    let mut app = build_test_app("movement");
    let building = spawn_blueprint(&mut app, &blueprint("store", Vec2::new(200.0, 0.0), storage()));
    let player = spawn_player(&mut app, Vec2::new(-200.0, 0.0));
    give_player(&mut app, &[("wood", 3)]);
    enter_playing_state(&mut app);

    let input = zone_centre(&mut app, building, ZoneKind::Input);
    move_player(&mut app, player, input);
    app.update();

    let stored = |app: &App| app.world().get::<Workshop>(building).unwrap().stored.count(&k("wood"));
    assert_eq!(stored(&app), 1, "first unit moves on the first settled tick");
    assert_eq!(player_count(&app, "wood"), 2);

    // Shuffle back and forth inside the zone.
    for step in 0..10 {
        let offset = if step % 2 == 0 { 2.0 } else { -2.0 };
        move_player(&mut app, player, input + Vec2::new(offset, 0.0));
        app.update();
        if step == 0 {
            let events = app.world().resource::<Events<BuildingFxEvent>>();
            assert!(
                events
                    .iter_current_update_events()
                    .any(|e| e.owner == building && e.request == FxRequest::CancelFlight),
                "the in-flight unit is cancelled when the actor starts moving"
            );
        }
    }
    assert_eq!(stored(&app), 1, "no transfer while moving, nothing rolled back");
    assert_eq!(player_count(&app, "wood"), 2);

    // Stand still again and the loop resumes.
    run_frames(&mut app, 40);
    assert_eq!(stored(&app), 3);
    assert_eq!(player_count(&app, "wood"), 0);
}

#[test]
fn test_walking_is_detected_at_high_frame_rates() {
    // 200 fps: walking speed covers well under a pixel per frame.
    let mut app = build_test_app_with_frame("movement-200fps", Duration::from_millis(5));
    let building = spawn_blueprint(&mut app, &blueprint("store", Vec2::new(200.0, 0.0), storage()));
    let player = spawn_player(&mut app, Vec2::new(-200.0, 0.0));
    give_player(&mut app, &[("wood", 3)]);
    enter_playing_state(&mut app);

    let input = zone_centre(&mut app, building, ZoneKind::Input);
    move_player(&mut app, player, input);
    app.update();

    let stored = |app: &App| app.world().get::<Workshop>(building).unwrap().stored.count(&k("wood"));
    assert_eq!(stored(&app), 1);

    // Walk up and down inside the zone at PLAYER_SPEED for 1.5 s.
    let step = PLAYER_SPEED * 0.005;
    let mut offset: f32 = 0.0;
    let mut direction: f32 = 1.0;
    let mut cancelled = false;
    for _ in 0..300 {
        if offset.abs() >= 10.0 {
            direction = -direction;
        }
        offset += step * direction;
        move_player(&mut app, player, input + Vec2::new(0.0, offset));
        app.update();

        let occupancy = app.world().get::<ZoneOccupancy>(building).unwrap();
        assert!(occupancy.in_input, "the walk stays inside the input zone");
        assert!(occupancy.is_moving, "walking is detected on every frame");
        let events = app.world().resource::<Events<BuildingFxEvent>>();
        cancelled |= events
            .iter_current_update_events()
            .any(|e| e.owner == building && e.request == FxRequest::CancelFlight);
    }
    assert!(cancelled, "the in-flight unit is cancelled once walking starts");
    assert_eq!(stored(&app), 1, "no transfer while walking");
    assert_eq!(player_count(&app, "wood"), 2);

    run_frames(&mut app, 1000);
    assert_eq!(stored(&app), 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction: deposits, hits, then exactly one completion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_construction_completes_exactly_once() {
    let mut app = build_test_app("construction");
    let mut plan = blueprint("hut", Vec2::new(200.0, 0.0), storage());
    plan.construction = Some(ConstructionPlan {
        stages: vec![ConstructionStage::new("wood", 2)],
        hits_required: 2,
        hit_cooldown_secs: 0.25,
    });
    let building = spawn_blueprint(&mut app, &plan);
    let player = spawn_player(&mut app, Vec2::new(-200.0, 0.0));
    give_player(&mut app, &[("wood", 5)]);
    enter_playing_state(&mut app);

    let mut cursor: EventCursor<ConstructionCompletedEvent> = app
        .world()
        .resource::<Events<ConstructionCompletedEvent>>()
        .get_cursor();
    let mut completions = 0;

    let site = zone_centre(&mut app, building, ZoneKind::Site);
    move_player(&mut app, player, site);
    for _ in 0..80 {
        app.update();
        let events = app.world().resource::<Events<ConstructionCompletedEvent>>();
        for event in cursor.read(events) {
            assert_eq!(event.building, building);
            assert_eq!(event.building_id.as_str(), "hut");
            completions += 1;
        }
        if completions == 0 {
            assert!(
                app.world().get::<Workshop>(building).is_none(),
                "not operational before completion"
            );
        }
    }

    assert_eq!(completions, 1);
    assert!(app.world().get::<ConstructionSite>(building).is_none());
    assert!(app.world().get::<Workshop>(building).is_some());
    assert_eq!(player_count(&app, "wood"), 3, "only the stage amount was taken");
}

#[test]
fn test_side_zones_are_dead_until_construction_finishes() {
    let mut app = build_test_app("dead-zones");
    let mut plan = blueprint("hut", Vec2::new(200.0, 0.0), storage());
    plan.construction = Some(ConstructionPlan {
        stages: vec![ConstructionStage::new("wood", 1)],
        hits_required: 1,
        hit_cooldown_secs: 0.25,
    });
    let building = spawn_blueprint(&mut app, &plan);
    let player = spawn_player(&mut app, Vec2::new(-200.0, 0.0));
    enter_playing_state(&mut app);

    // The input zone overlaps the edge of the site footprint.
    let input = zone_centre(&mut app, building, ZoneKind::Input);
    move_player(&mut app, player, input);
    run_frames(&mut app, 2);

    let occupancy = app.world().get::<ZoneOccupancy>(building).unwrap();
    assert!(!occupancy.in_input, "input zone is dead while under construction");
    assert!(occupancy.in_site);
}

// ─────────────────────────────────────────────────────────────────────────────
// Zones: enter and exit edges reach the owner
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_zone_enter_and_exit_update_occupancy() {
    let mut app = build_test_app("zones");
    let building = spawn_blueprint(&mut app, &blueprint("store", Vec2::new(200.0, 0.0), storage()));
    let player = spawn_player(&mut app, Vec2::new(-200.0, 0.0));
    enter_playing_state(&mut app);

    let occupancy = app.world().get::<ZoneOccupancy>(building).unwrap();
    assert!(!occupancy.is_engaged());

    let output = zone_centre(&mut app, building, ZoneKind::Output);
    move_player(&mut app, player, output);
    app.update();

    let occupancy = app.world().get::<ZoneOccupancy>(building).unwrap();
    assert!(occupancy.in_output);
    assert!(!occupancy.in_input);
    assert_eq!(occupancy.actor, Some(player));
    assert!(occupancy.is_settled());

    move_player(&mut app, player, Vec2::new(-200.0, 0.0));
    app.update();

    let occupancy = app.world().get::<ZoneOccupancy>(building).unwrap();
    assert!(!occupancy.in_any());
    assert_eq!(occupancy.actor, None, "actor released on the last exit");
}

// ─────────────────────────────────────────────────────────────────────────────
// Harvest: stand by a node until it pays out
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_harvest_node_pays_out_and_despawns_with_its_zone() {
    let mut app = build_test_app("harvest");
    let node_blueprint = HarvestNodeBlueprint {
        position: Vec2::new(150.0, 150.0),
        kind: "wood",
        amount: 3,
        hits_required: 2,
        hit_delay_secs: 0.25,
        radius: TILE_SIZE,
    };
    let node = {
        let catalog = app.world().resource::<ResourceCatalog>().clone();
        let world = app.world_mut();
        let node = {
            let mut commands = world.commands();
            spawn_harvest_node(&mut commands, &node_blueprint, &catalog)
        };
        world.flush();
        node
    };
    let player = spawn_player(&mut app, Vec2::new(-200.0, 0.0));
    enter_playing_state(&mut app);

    let mut cursor: EventCursor<NodeHarvestedEvent> = app
        .world()
        .resource::<Events<NodeHarvestedEvent>>()
        .get_cursor();

    move_player(&mut app, player, node_blueprint.position);
    run_frames(&mut app, 3);
    assert!(app.world().get::<HarvestNode>(node).is_some(), "still standing after one hit");
    assert_eq!(player_count(&app, "wood"), 0);

    let mut harvested: Vec<(ResourceKind, u32)> = Vec::new();
    for _ in 0..10 {
        app.update();
        let events = app.world().resource::<Events<NodeHarvestedEvent>>();
        harvested.extend(cursor.read(events).map(|event| (event.kind.clone(), event.amount)));
    }
    assert!(!app.world().entities().contains(node), "node despawned after payout");
    assert_eq!(player_count(&app, "wood"), 3);
    assert_eq!(harvested, vec![(k("wood"), 3)], "one payout announced");

    let mut zones = app.world_mut().query::<&TriggerZone>();
    assert!(
        zones.iter(app.world()).all(|zone| zone.owner != node),
        "orphaned zone cleaned up"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Save / load: JSON round trip through the real plugin
// ─────────────────────────────────────────────────────────────────────────────

fn save_fixture_buildings(app: &mut App) -> (Entity, Entity) {
    let mut store = blueprint("store", Vec2::new(200.0, 0.0), storage());
    store.initial = vec![("wood", 4)];
    let store = spawn_blueprint(app, &store);

    let mut hut = blueprint("hut", Vec2::new(-200.0, 0.0), storage());
    hut.construction = Some(ConstructionPlan {
        stages: vec![ConstructionStage::new("wood", 5), ConstructionStage::new("stone", 5)],
        hits_required: 4,
        hit_cooldown_secs: 0.25,
    });
    let hut = spawn_blueprint(app, &hut);
    (store, hut)
}

#[test]
fn test_save_then_load_restores_buildings_and_player() {
    // Session one: play a little, then save.
    let mut app = build_test_app("round-trip");
    let config = app.world().resource::<SaveConfig>().clone();
    let (_, hut) = save_fixture_buildings(&mut app);
    spawn_player(&mut app, Vec2::new(0.0, 200.0));
    enter_playing_state(&mut app);

    give_player(&mut app, &[("stone", 3)]);
    {
        let mut site = app.world_mut().get_mut::<ConstructionSite>(hut).unwrap();
        let deposits: ResourceLedger = [(k("wood"), 5), (k("stone"), 2)].into_iter().collect();
        site.restore(deposits, 0);
    }

    let mut cursor: EventCursor<SaveCompleteEvent> = app
        .world()
        .resource::<Events<SaveCompleteEvent>>()
        .get_cursor();
    app.world_mut().send_event(SaveRequestEvent);
    app.world_mut().send_event(SaveRequestEvent);
    app.update();
    let results: Vec<SaveCompleteEvent> = cursor
        .read(app.world().resource::<Events<SaveCompleteEvent>>())
        .cloned()
        .collect();
    assert_eq!(results.len(), 1, "two requests in one frame write once");
    assert!(results[0].success);

    let saved = read_save(&config).unwrap().unwrap();
    assert_eq!(saved.version, SAVE_VERSION);
    assert_eq!(saved.buildings.len(), 2);

    // Session two: fresh scene, same ids, load on entering Playing.
    let mut app = build_test_app("round-trip-load");
    app.insert_resource(config.clone());
    let (store, hut) = save_fixture_buildings(&mut app);
    enter_playing_state(&mut app);

    assert_eq!(player_count(&app, "stone"), 3);
    let workshop = app.world().get::<Workshop>(store).unwrap();
    assert_eq!(workshop.stored.count(&k("wood")), 4);
    let site = app.world().get::<ConstructionSite>(hut).unwrap();
    assert_eq!(site.deposited().count(&k("wood")), 5);
    assert_eq!(site.deposited().count(&k("stone")), 2);
    assert_eq!(site.hits(), 0);
    assert!(app.world().get::<Workshop>(hut).is_none());

    let _ = std::fs::remove_dir_all(&config.directory);
}

#[test]
fn test_load_skips_unknown_resources_and_buildings() {
    let mut app = build_test_app("unknown-entries");
    let config = app.world().resource::<SaveConfig>().clone();
    let data = GameSaveData {
        version: SAVE_VERSION,
        player_inventory: vec![
            ResourceSaveData::new("wood", 2),
            ResourceSaveData::new("Wood_Deprecated", 9),
        ],
        buildings: vec![
            BuildingSaveData {
                building_id: "store".into(),
                is_constructed: true,
                stored_resources: vec![
                    ResourceSaveData::new("stone", 6),
                    ResourceSaveData::new("Wood_Deprecated", 1),
                ],
            },
            BuildingSaveData {
                building_id: "demolished".into(),
                is_constructed: true,
                stored_resources: vec![ResourceSaveData::new("wood", 1)],
            },
            BuildingSaveData {
                building_id: "hut".into(),
                is_constructed: true,
                stored_resources: Vec::new(),
            },
        ],
    };
    write_save(&config, &data).unwrap();

    let (store, hut) = save_fixture_buildings(&mut app);
    let mut cursor: EventCursor<LoadCompleteEvent> = app
        .world()
        .resource::<Events<LoadCompleteEvent>>()
        .get_cursor();
    enter_playing_state(&mut app);

    let loads: Vec<LoadCompleteEvent> = cursor
        .read(app.world().resource::<Events<LoadCompleteEvent>>())
        .cloned()
        .collect();
    assert_eq!(loads.len(), 1);
    assert!(loads[0].success);
    assert_eq!(loads[0].buildings_restored, 2, "the unknown id is skipped");

    assert_eq!(player_count(&app, "wood"), 2);
    assert_eq!(app.world().resource::<PlayerInventory>().ledger.total(), 2);

    let expected: ResourceLedger = [(k("stone"), 6)].into_iter().collect();
    assert_eq!(app.world().get::<Workshop>(store).unwrap().stored, expected);

    // Constructed in the save: operational without replaying completion.
    app.update();
    assert!(app.world().get::<ConstructionSite>(hut).is_none());
    assert!(app.world().get::<Workshop>(hut).is_some());
    let completions = app.world().resource::<Events<ConstructionCompletedEvent>>();
    assert!(completions.is_empty());

    let _ = std::fs::remove_dir_all(&config.directory);
}

// ─────────────────────────────────────────────────────────────────────────────
// Save triggers: pause, quit, and a write that fails halfway
// ─────────────────────────────────────────────────────────────────────────────

fn saved_player_count(config: &SaveConfig, name: &str) -> Option<u32> {
    let saved = read_save(config).unwrap()?;
    Some(
        saved
            .player_inventory
            .iter()
            .filter(|entry| entry.resource_name == name)
            .map(|entry| entry.amount)
            .sum(),
    )
}

#[test]
fn test_pausing_writes_the_save() {
    let mut app = build_test_app("pause-save");
    let config = app.world().resource::<SaveConfig>().clone();
    save_fixture_buildings(&mut app);
    spawn_player(&mut app, Vec2::new(0.0, 200.0));
    enter_playing_state(&mut app);
    assert!(!config.path().exists(), "nothing written before the pause");

    give_player(&mut app, &[("stone", 2)]);
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Paused);
    run_frames(&mut app, 2);

    assert_eq!(
        app.world().resource::<State<GameState>>().get(),
        &GameState::Paused
    );
    assert_eq!(saved_player_count(&config, "stone"), Some(2));
    let saved = read_save(&config).unwrap().unwrap();
    assert_eq!(saved.buildings.len(), 2);

    let _ = std::fs::remove_dir_all(&config.directory);
}

#[test]
fn test_app_exit_writes_the_save() {
    let mut app = build_test_app("exit-save");
    let config = app.world().resource::<SaveConfig>().clone();
    save_fixture_buildings(&mut app);
    spawn_player(&mut app, Vec2::new(0.0, 200.0));
    enter_playing_state(&mut app);

    give_player(&mut app, &[("wood", 4)]);
    app.world_mut().send_event(AppExit::Success);
    app.update();

    assert_eq!(saved_player_count(&config, "wood"), Some(4));

    let _ = std::fs::remove_dir_all(&config.directory);
}

#[test]
fn test_failed_write_leaves_previous_save_intact() {
    let mut app = build_test_app("failed-write");
    let config = app.world().resource::<SaveConfig>().clone();
    save_fixture_buildings(&mut app);
    spawn_player(&mut app, Vec2::new(0.0, 200.0));
    enter_playing_state(&mut app);

    give_player(&mut app, &[("stone", 1)]);
    app.world_mut().send_event(SaveRequestEvent);
    app.update();
    let before = std::fs::read_to_string(config.path()).unwrap();

    // A directory squatting on the temp path makes the write itself fail.
    let tmp_path = config.path().with_extension("json.tmp");
    std::fs::create_dir_all(&tmp_path).unwrap();

    let mut cursor: EventCursor<SaveCompleteEvent> = app
        .world()
        .resource::<Events<SaveCompleteEvent>>()
        .get_cursor_current();
    give_player(&mut app, &[("stone", 5)]);
    app.world_mut().send_event(SaveRequestEvent);
    app.update();

    let results: Vec<SaveCompleteEvent> = cursor
        .read(app.world().resource::<Events<SaveCompleteEvent>>())
        .cloned()
        .collect();
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert!(results[0].error_message.is_some());

    let after = std::fs::read_to_string(config.path()).unwrap();
    assert_eq!(after, before, "the old save is untouched");
    assert_eq!(saved_player_count(&config, "stone"), Some(1));

    let _ = std::fs::remove_dir_all(&config.directory);
}

// ─────────────────────────────────────────────────────────────────────────────
// Delete save: the yard restarts, so nothing writes the old progress back
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_delete_save_resets_yard_and_exit_does_not_restore_it() {
    let mut app = build_test_app("delete-save");
    app.add_plugins((DataPlugin, PlayerPlugin));
    let config = app.world().resource::<SaveConfig>().clone();
    app.update();
    app.update();
    assert_eq!(
        app.world().resource::<State<GameState>>().get(),
        &GameState::Playing
    );

    give_player(&mut app, &[("wood", 7)]);
    app.world_mut().send_event(SaveRequestEvent);
    app.update();
    assert_eq!(saved_player_count(&config, "wood"), Some(7));

    app.world_mut().send_event(DeleteSaveEvent);
    app.update();
    assert!(!config.path().exists(), "save file removed");
    assert_eq!(app.world().resource::<PlayerInventory>().ledger.total(), 0);

    // Loading spawns the fresh yard, then Playing loads (nothing) and respawns the player.
    run_frames(&mut app, 2);
    assert_eq!(
        app.world().resource::<State<GameState>>().get(),
        &GameState::Playing
    );
    let mut sites = app.world_mut().query::<&ConstructionSite>();
    let mut workshops = app.world_mut().query::<&Workshop>();
    let mut players = app.world_mut().query::<&Player>();
    assert_eq!(sites.iter(app.world()).count(), 2, "old scene replaced, not duplicated");
    assert_eq!(workshops.iter(app.world()).count(), 3);
    assert_eq!(players.iter(app.world()).count(), 1);

    app.world_mut().send_event(AppExit::Success);
    app.update();

    assert_eq!(player_count(&app, "wood"), 0);
    assert_eq!(
        saved_player_count(&config, "wood").unwrap_or(0),
        0,
        "the deleted progress never comes back"
    );

    let _ = std::fs::remove_dir_all(&config.directory);
}
