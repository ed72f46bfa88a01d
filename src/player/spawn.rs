use bevy::prelude::*;
use crate::shared::*;

/// World position the player starts at, in the middle of the yard.
pub const PLAYER_SPAWN: Vec2 = Vec2::new(0.0, 0.0);

/// Spawn the player entity with all necessary components.
/// Runs on `OnEnter(GameState::Playing)`.
pub fn spawn_player(
    mut commands: Commands,
    existing: Query<Entity, With<Player>>,
) {
    // Guard: don't double-spawn when resuming from Paused.
    if !existing.is_empty() {
        return;
    }

    commands.spawn((
        Player,
        PlayerMovement::default(),
        // Placeholder sprite, a blue square
        Sprite {
            color: Color::srgb(0.2, 0.5, 0.8),
            custom_size: Some(Vec2::new(TILE_SIZE * 0.75, TILE_SIZE)),
            ..default()
        },
        Transform::from_translation(PLAYER_SPAWN.extend(Z_PLAYER)),
        Visibility::default(),
    ));
}
