use bevy::prelude::*;
use crate::save::{DeleteSaveEvent, SaveRequestEvent};
use crate::settings::{GameSettings, SettingsChangedEvent};
use crate::shared::*;
use super::UiFontHandle;

const VOLUME_STEP: f32 = 0.1;

#[derive(Resource, Debug, Clone, Default)]
pub struct SettingsPanelState {
    pub open: bool,
}

#[derive(Component)]
pub struct SettingsPanelRoot;

#[derive(Component)]
pub struct SettingsPanelText;

pub fn settings_lines(settings: &GameSettings) -> String {
    format!(
        "Volume  {:>3}%   (Left / Right)\nVibration  {}   (V)\n\nEnter  save now\nDelete  erase save\nTab  close",
        (settings.master_volume * 100.0).round() as i32,
        if settings.vibration_enabled { "on" } else { "off" },
    )
}

pub fn toggle_settings_panel(
    mut commands: Commands,
    input: Res<PlayerInput>,
    mut panel: ResMut<SettingsPanelState>,
    font_handle: Res<UiFontHandle>,
    settings: Res<GameSettings>,
    roots: Query<Entity, With<SettingsPanelRoot>>,
) {
    if !input.toggle_settings {
        return;
    }
    panel.open = !panel.open;

    if !panel.open {
        for entity in &roots {
            commands.entity(entity).despawn_recursive();
        }
        return;
    }

    commands
        .spawn((
            SettingsPanelRoot,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                right: Val::Px(12.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(10.0)),
                row_gap: Val::Px(6.0),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.08, 0.08, 0.12, 0.9)),
            BorderColor(Color::srgba(0.6, 0.6, 0.7, 0.8)),
            GlobalZIndex(20),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Settings"),
                TextFont {
                    font: font_handle.0.clone(),
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.6)),
            ));
            parent.spawn((
                SettingsPanelText,
                Text::new(settings_lines(&settings)),
                TextFont {
                    font: font_handle.0.clone(),
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn settings_panel_input(
    keys: Res<ButtonInput<KeyCode>>,
    panel: Res<SettingsPanelState>,
    settings: Res<GameSettings>,
    mut changes: EventWriter<SettingsChangedEvent>,
    mut save_writer: EventWriter<SaveRequestEvent>,
    mut delete_writer: EventWriter<DeleteSaveEvent>,
) {
    if !panel.open {
        return;
    }
    if keys.just_pressed(KeyCode::ArrowLeft) {
        changes.send(SettingsChangedEvent::MasterVolume(settings.master_volume - VOLUME_STEP));
    }
    if keys.just_pressed(KeyCode::ArrowRight) {
        changes.send(SettingsChangedEvent::MasterVolume(settings.master_volume + VOLUME_STEP));
    }
    if keys.just_pressed(KeyCode::KeyV) {
        changes.send(SettingsChangedEvent::Vibration(!settings.vibration_enabled));
    }
    if keys.just_pressed(KeyCode::Enter) {
        save_writer.send(SaveRequestEvent);
    }
    if keys.just_pressed(KeyCode::Delete) {
        delete_writer.send(DeleteSaveEvent);
    }
}

pub fn refresh_settings_panel(
    settings: Res<GameSettings>,
    mut texts: Query<&mut Text, With<SettingsPanelText>>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut text in &mut texts {
        **text = settings_lines(&settings);
    }
}
