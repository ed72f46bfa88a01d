use bevy::prelude::*;
use crate::shared::*;

/// Move the player along `PlayerInput::move_axis` at its walking speed.
///
/// Movement is continuous; the buildings only ever look at the resulting
/// translation.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut query: Query<(&mut Transform, &mut PlayerMovement), With<Player>>,
) {
    let Ok((mut transform, mut movement)) = query.get_single_mut() else {
        return;
    };

    if input.move_axis == Vec2::ZERO {
        movement.is_moving = false;
        return;
    }

    movement.is_moving = true;
    let delta = input.move_axis.clamp_length_max(1.0) * movement.speed * time.delta_secs();
    transform.translation.x += delta.x;
    transform.translation.y += delta.y;
}
