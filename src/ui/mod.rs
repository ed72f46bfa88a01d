mod hud;
mod pause_menu;
mod settings_panel;
mod toast;

use bevy::prelude::*;
use crate::shared::*;

pub use hud::{inventory_lines, HudInventoryList};
pub use settings_panel::SettingsPanelState;
pub use toast::{ToastContainer, ToastItem};

/// Font used by every UI node. The default handle is Bevy's built-in font.
#[derive(Resource, Debug, Clone, Default)]
pub struct UiFontHandle(pub Handle<Font>);

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiFontHandle>()
            .init_resource::<SettingsPanelState>();

        // ─── TOASTS — always present ───
        app.add_systems(Startup, toast::spawn_toast_container);
        app.add_systems(
            Update,
            (
                toast::wire_save_toasts,
                toast::wire_load_toasts,
                toast::wire_harvest_toasts,
                toast::handle_toast_events,
                toast::update_toasts,
            )
                .chain(),
        );

        // ─── HUD — spawned once the scene is up ───
        app.add_systems(OnEnter(GameState::Playing), hud::spawn_hud);
        app.add_systems(
            Update,
            hud::update_inventory_hud.run_if(in_state(GameState::Playing)),
        );

        // ─── PAUSE ───
        app.add_systems(OnEnter(GameState::Paused), pause_menu::spawn_pause_menu);
        app.add_systems(OnExit(GameState::Paused), pause_menu::despawn_pause_menu);
        app.add_systems(
            Update,
            pause_menu::toggle_pause
                .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
        );

        // ─── SETTINGS PANEL ───
        app.add_systems(
            Update,
            (
                settings_panel::toggle_settings_panel,
                settings_panel::settings_panel_input,
                settings_panel::refresh_settings_panel,
            )
                .chain()
                .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
        );
    }
}
