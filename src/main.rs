mod shared;
mod input;
mod player;
mod buildings;
mod harvest;
mod fx;
mod ui;
mod save;
mod settings;
mod data;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Forgeyard".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<PlayerInventory>()
        .init_resource::<ResourceCatalog>()
        .init_resource::<PlayerInput>()
        // Events
        .add_event::<ZoneEvent>()
        .add_event::<BuildingFxEvent>()
        .add_event::<ConstructionCompletedEvent>()
        .add_event::<NodeHarvestedEvent>()
        .add_event::<ToastEvent>()
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(buildings::BuildingsPlugin)
        .add_plugins(harvest::HarvestPlugin)
        .add_plugins(fx::FxPlugin)
        .add_plugins(ui::UiPlugin)
        .add_plugins(settings::SettingsPlugin)
        .add_plugins(save::SavePlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_scale(Vec3::splat(1.0 / PIXEL_SCALE)),
    ));
}
