mod camera;
mod movement;
mod spawn;

use bevy::prelude::*;
use crate::shared::*;

pub use camera::camera_follow_player;
pub use movement::player_movement;
pub use spawn::{spawn_player, PLAYER_SPAWN};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // -- Spawn player when we enter Playing --
        app.add_systems(OnEnter(GameState::Playing), spawn::spawn_player);

        // -- Movement first so zone detection sees this frame's position --
        app.add_systems(
            Update,
            (
                movement::player_movement.before(ZoneSystems),
                camera::camera_follow_player.after(movement::player_movement),
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}
