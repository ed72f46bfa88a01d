use bevy::prelude::*;
use crate::shared::*;

const CAMERA_LERP_SPEED: f32 = 5.0;

/// Smoothly follow the player with the camera; snaps when the player is far
/// off screen (first frame, or after a teleport).
pub fn camera_follow_player(
    time: Res<Time>,
    player_query: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut camera_query: Query<&mut Transform, (With<Camera2d>, Without<Player>)>,
) {
    let Ok(player_tf) = player_query.get_single() else {
        return;
    };
    let Ok(mut cam_tf) = camera_query.get_single_mut() else {
        return;
    };

    let target = player_tf.translation.truncate();
    let current = cam_tf.translation.truncate();

    let next = if current.distance(target) > TILE_SIZE * 8.0 {
        target
    } else {
        let t = (CAMERA_LERP_SPEED * time.delta_secs()).min(1.0);
        current.lerp(target, t)
    };

    cam_tf.translation.x = next.x;
    cam_tf.translation.y = next.y;
}
