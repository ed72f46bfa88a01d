//! Player preferences (master volume, vibration), stored as RON next to the
//! save file and applied as soon as they change.

use bevy::audio::{GlobalVolume, Volume};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;

use crate::save::SaveConfig;

pub const SETTINGS_FILE: &str = "settings.ron";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// 0.0 ..= 1.0
    pub master_volume: f32,
    pub vibration_enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.7,
            vibration_enabled: true,
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum SettingsChangedEvent {
    MasterVolume(f32),
    Vibration(bool),
}

impl GameSettings {
    /// Apply one change. Returns true if anything actually changed.
    pub fn apply(&mut self, change: SettingsChangedEvent) -> bool {
        let before = self.clone();
        match change {
            SettingsChangedEvent::MasterVolume(volume) => {
                self.master_volume = volume.clamp(0.0, 1.0);
            }
            SettingsChangedEvent::Vibration(enabled) => self.vibration_enabled = enabled,
        }
        *self != before
    }
}

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SaveConfig>()
            .init_resource::<GameSettings>()
            .add_event::<SettingsChangedEvent>()
            .add_systems(Startup, load_settings)
            .add_systems(Update, handle_settings_changes);
    }
}

pub fn to_ron(settings: &GameSettings) -> Result<String, String> {
    ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::default())
        .map_err(|e| format!("Settings serialization failed: {}", e))
}

pub fn from_ron(text: &str) -> Result<GameSettings, String> {
    let mut settings: GameSettings =
        ron::from_str(text).map_err(|e| format!("Settings parse failed: {}", e))?;
    settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
    Ok(settings)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write_settings(config: &SaveConfig, settings: &GameSettings) -> Result<(), String> {
    fs::create_dir_all(&config.directory)
        .map_err(|e| format!("Could not create settings directory: {}", e))?;
    let path = config.directory.join(SETTINGS_FILE);
    let tmp_path = path.with_extension("ron.tmp");
    fs::write(&tmp_path, to_ron(settings)?)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))
}

#[cfg(target_arch = "wasm32")]
pub fn write_settings(_config: &SaveConfig, settings: &GameSettings) -> Result<(), String> {
    crate::save::local_storage()?
        .set_item(SETTINGS_FILE, &to_ron(settings)?)
        .map_err(|e| format!("localStorage write failed: {:?}", e))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn read_settings(config: &SaveConfig) -> Result<Option<GameSettings>, String> {
    let path = config.directory.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    from_ron(&text).map(Some)
}

#[cfg(target_arch = "wasm32")]
pub fn read_settings(_config: &SaveConfig) -> Result<Option<GameSettings>, String> {
    let text = crate::save::local_storage()?
        .get_item(SETTINGS_FILE)
        .map_err(|e| format!("localStorage read failed: {:?}", e))?;
    text.map(|text| from_ron(&text)).transpose()
}

fn load_settings(
    config: Res<SaveConfig>,
    mut settings: ResMut<GameSettings>,
    volume: Option<ResMut<GlobalVolume>>,
) {
    match read_settings(&config) {
        Ok(Some(loaded)) => {
            info!(
                "Settings loaded: volume {:.2}, vibration {}",
                loaded.master_volume, loaded.vibration_enabled
            );
            *settings = loaded;
        }
        Ok(None) => {}
        Err(e) => warn!("{}; using defaults", e),
    }
    if let Some(mut volume) = volume {
        volume.volume = Volume::new(settings.master_volume);
    }
}

fn handle_settings_changes(
    mut events: EventReader<SettingsChangedEvent>,
    config: Res<SaveConfig>,
    mut settings: ResMut<GameSettings>,
    volume: Option<ResMut<GlobalVolume>>,
) {
    let mut changed = false;
    for event in events.read() {
        changed |= settings.apply(*event);
    }
    if !changed {
        return;
    }

    if let Some(mut volume) = volume {
        volume.volume = Volume::new(settings.master_volume);
    }
    if let Err(e) = write_settings(&config, &settings) {
        warn!("Could not persist settings: {}", e);
    }
}
