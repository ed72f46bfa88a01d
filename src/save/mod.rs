mod format;

use bevy::prelude::*;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
use std::path::PathBuf;

use crate::buildings::{BuildingTuning, ConstructionSite, Workshop};
use crate::shared::*;

pub use format::{
    ledger_records, restore_ledger, restore_player, saved_hits, serialize_site, serialize_workshop,
    snapshot, BuildingSaveData, GameSaveData, ResourceSaveData, SAVE_VERSION,
};

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Sent by the quicksave key or the settings panel to trigger a save.
#[derive(Event, Debug, Clone, Default)]
pub struct SaveRequestEvent;

/// Sent by SavePlugin after a save completes (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

/// Sent by SavePlugin after the startup load.
#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
    pub buildings_restored: usize,
    pub error_message: Option<String>,
}

/// Remove the save file and reload the yard from scratch.
#[derive(Event, Debug, Clone, Default)]
pub struct DeleteSaveEvent;

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// Where the save lives. On wasm32 `file_name` is the localStorage key.
#[derive(Resource, Debug, Clone)]
pub struct SaveConfig {
    pub directory: PathBuf,
    pub file_name: String,
}

impl Default for SaveConfig {
    fn default() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            directory: exe_dir.join("saves"),
            file_name: "game_save.json".to_string(),
        }
    }
}

impl SaveConfig {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// The startup load already ran; resuming from Paused must not reload.
#[derive(Resource, Debug, Clone, Default)]
pub struct SaveLoaded(pub bool);

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .init_resource::<SaveConfig>()
            .init_resource::<SaveLoaded>()
            // Events emitted/received by this plugin
            .add_event::<SaveRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_event::<DeleteSaveEvent>()
            // Load once the scene exists
            .add_systems(OnEnter(GameState::Playing), load_game_once)
            // Application pause
            .add_systems(OnEnter(GameState::Paused), save_on_pause)
            .add_systems(
                Update,
                (quicksave_keybind, handle_save_request, handle_delete_save)
                    .chain()
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
            )
            // Application quit
            .add_systems(Last, save_on_exit);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// STORAGE
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
pub fn write_save(config: &SaveConfig, data: &GameSaveData) -> Result<(), String> {
    fs::create_dir_all(&config.directory)
        .map_err(|e| format!("Could not create saves directory: {}", e))?;

    let json =
        serde_json::to_string_pretty(data).map_err(|e| format!("Serialization failed: {}", e))?;

    let path = config.path();
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .ok_or_else(|| "No browser window".to_string())?
        .local_storage()
        .map_err(|e| format!("localStorage unavailable: {:?}", e))?
        .ok_or_else(|| "localStorage unavailable".to_string())
}

#[cfg(target_arch = "wasm32")]
pub fn write_save(config: &SaveConfig, data: &GameSaveData) -> Result<(), String> {
    let json = serde_json::to_string(data).map_err(|e| format!("Serialization failed: {}", e))?;
    local_storage()?
        .set_item(&config.file_name, &json)
        .map_err(|e| format!("localStorage write failed: {:?}", e))
}

/// `Ok(None)` when there is no save yet.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_save(config: &SaveConfig) -> Result<Option<GameSaveData>, String> {
    let path = config.path();
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(&path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    parse_save(&json).map(Some)
}

#[cfg(target_arch = "wasm32")]
pub fn read_save(config: &SaveConfig) -> Result<Option<GameSaveData>, String> {
    let json = local_storage()?
        .get_item(&config.file_name)
        .map_err(|e| format!("localStorage read failed: {:?}", e))?;
    json.map(|json| parse_save(&json)).transpose()
}

fn parse_save(json: &str) -> Result<GameSaveData, String> {
    let data: GameSaveData =
        serde_json::from_str(json).map_err(|e| format!("Deserialization failed: {}", e))?;

    // Version check — future versions can add migration here
    if data.version != SAVE_VERSION {
        warn!(
            "Save has version {} but current version is {}. Attempting to load anyway.",
            data.version, SAVE_VERSION
        );
    }
    Ok(data)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn delete_save(config: &SaveConfig) -> Result<bool, String> {
    let path = config.path();
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(&path).map_err(|e| format!("Delete failed for {}: {}", path.display(), e))?;
    Ok(true)
}

#[cfg(target_arch = "wasm32")]
pub fn delete_save(config: &SaveConfig) -> Result<bool, String> {
    let storage = local_storage()?;
    let existed = storage
        .get_item(&config.file_name)
        .map_err(|e| format!("localStorage read failed: {:?}", e))?
        .is_some();
    storage
        .remove_item(&config.file_name)
        .map_err(|e| format!("localStorage delete failed: {:?}", e))?;
    Ok(existed)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

type BuildingSnapshotQuery<'w, 's> =
    Query<'w, 's, (&'static BuildingId, Option<&'static Workshop>, Option<&'static ConstructionSite>)>;

fn save_game(
    config: &SaveConfig,
    inventory: &PlayerInventory,
    buildings: &BuildingSnapshotQuery,
) -> Result<usize, String> {
    let data = snapshot(&inventory.ledger, buildings.iter());
    write_save(config, &data)?;
    Ok(data.buildings.len())
}

/// F5 = quicksave.
fn quicksave_keybind(
    player_input: Option<Res<PlayerInput>>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    if player_input.is_some_and(|input| input.quicksave) {
        info!("F5 quicksave");
        save_writer.send(SaveRequestEvent);
    }
}

pub fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    config: Res<SaveConfig>,
    inventory: Res<PlayerInventory>,
    buildings: BuildingSnapshotQuery,
) {
    // Several requests in one frame produce one write.
    if save_events.read().count() == 0 {
        return;
    }

    info!("Saving to {}...", config.path().display());
    match save_game(&config, &inventory, &buildings) {
        Ok(count) => {
            info!("Save succeeded ({} buildings).", count);
            complete_events.send(SaveCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("Save FAILED: {}", e);
            complete_events.send(SaveCompleteEvent {
                success: false,
                error_message: Some(e),
            });
        }
    }
}

fn save_on_pause(mut save_writer: EventWriter<SaveRequestEvent>) {
    info!("Paused, saving");
    save_writer.send(SaveRequestEvent);
}

fn save_on_exit(
    mut exit_events: EventReader<AppExit>,
    config: Res<SaveConfig>,
    loaded: Res<SaveLoaded>,
    inventory: Res<PlayerInventory>,
    buildings: BuildingSnapshotQuery,
) {
    if exit_events.read().count() == 0 {
        return;
    }
    // Quitting before the scene loaded would overwrite the save with defaults.
    if !loaded.0 {
        return;
    }
    match save_game(&config, &inventory, &buildings) {
        Ok(_) => info!("Saved on exit."),
        Err(e) => warn!("Save on exit FAILED: {}", e),
    }
}

type SceneEntityQuery<'w, 's> =
    Query<'w, 's, Entity, Or<(With<ZoneOccupancy>, With<TriggerZone>, With<Player>)>>;

/// Remove the save and restart the yard from its fresh layout, so nothing
/// still in memory can write the deleted progress back on pause or quit.
fn handle_delete_save(
    mut commands: Commands,
    mut events: EventReader<DeleteSaveEvent>,
    config: Res<SaveConfig>,
    mut loaded: ResMut<SaveLoaded>,
    mut inventory: ResMut<PlayerInventory>,
    scene: SceneEntityQuery,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.read().count() == 0 {
        return;
    }
    match delete_save(&config) {
        Ok(true) => info!("Save deleted."),
        Ok(false) => info!("No save to delete."),
        Err(e) => {
            warn!("{}", e);
            return;
        }
    }

    for entity in &scene {
        commands.entity(entity).despawn_recursive();
    }
    inventory.ledger.clear();
    loaded.0 = false;
    info!("Reloading the yard");
    next_state.set(GameState::Loading);
}

/// Restore the save into the freshly spawned scene, exactly once.
#[allow(clippy::too_many_arguments)]
pub fn load_game_once(
    mut commands: Commands,
    mut loaded: ResMut<SaveLoaded>,
    config: Res<SaveConfig>,
    catalog: Res<ResourceCatalog>,
    tuning: Res<BuildingTuning>,
    mut inventory: ResMut<PlayerInventory>,
    mut buildings: Query<(Entity, &BuildingId, Option<&mut Workshop>, Option<&mut ConstructionSite>)>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
) {
    if loaded.0 {
        return;
    }
    loaded.0 = true;

    let data = match read_save(&config) {
        Ok(Some(data)) => data,
        Ok(None) => {
            info!("No save found, starting fresh.");
            complete_events.send(LoadCompleteEvent {
                success: true,
                buildings_restored: 0,
                error_message: None,
            });
            return;
        }
        Err(e) => {
            warn!("Load FAILED: {}", e);
            complete_events.send(LoadCompleteEvent {
                success: false,
                buildings_restored: 0,
                error_message: Some(e),
            });
            return;
        }
    };

    restore_player(&mut inventory.ledger, &data, &catalog);

    let by_id: HashMap<String, Entity> = buildings
        .iter()
        .map(|(entity, id, _, _)| (id.as_str().to_string(), entity))
        .collect();

    let mut restored = 0;
    for record in &data.buildings {
        let Some(&entity) = by_id.get(&record.building_id) else {
            warn!("Save references unknown building '{}', skipped", record.building_id);
            continue;
        };
        let Ok((_, _, workshop, site)) = buildings.get_mut(entity) else {
            continue;
        };

        let (ledger, unknown) = restore_ledger(&record.stored_resources, &catalog);
        for name in unknown {
            warn!("Building '{}': unknown resource '{}' skipped", record.building_id, name);
        }

        match (record.is_constructed, workshop, site) {
            (true, Some(mut workshop), _) => {
                workshop.replace_stored(ledger);
            }
            (true, None, Some(mut site)) => {
                // Finished in the save: become operational without replaying
                // the completion presentation.
                site.mark_complete();
                commands
                    .entity(entity)
                    .remove::<ConstructionSite>()
                    .insert(
                        Workshop::new(
                            site.function.clone(),
                            tuning.transfer_delay_secs,
                            tuning.zone_exit_policy,
                        )
                        .with_stored(ledger),
                    );
            }
            (false, None, Some(mut site)) => {
                let hits = saved_hits(&record.stored_resources).unwrap_or(0);
                for kind in site.restore(ledger, hits) {
                    warn!(
                        "Building '{}': '{}' is not a construction stage, skipped",
                        record.building_id, kind
                    );
                }
            }
            (false, Some(_), _) => {
                warn!(
                    "Building '{}' is already operational; under-construction record skipped",
                    record.building_id
                );
                continue;
            }
            (_, None, None) => continue,
        }
        restored += 1;
    }

    info!(
        "Load succeeded: {} player entries, {} buildings restored.",
        inventory.ledger.positive().count(),
        restored
    );
    complete_events.send(LoadCompleteEvent {
        success: true,
        buildings_restored: restored,
        error_message: None,
    });
}
