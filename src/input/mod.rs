use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VirtualJoystick>()
            .add_systems(PreUpdate, (track_virtual_joystick, reset_and_read_input).chain());
    }
}

/// Touch / left-drag joystick. The press point is the stick origin.
#[derive(Resource, Debug, Clone, Default)]
pub struct VirtualJoystick {
    pub origin: Option<Vec2>,
    pub current: Vec2,
}

impl VirtualJoystick {
    /// Direction from origin to the drag point, clamped to unit length at
    /// `JOYSTICK_RADIUS`. Screen y grows downward, world y upward.
    pub fn axis(&self) -> Vec2 {
        let Some(origin) = self.origin else {
            return Vec2::ZERO;
        };
        let delta = self.current - origin;
        let axis = Vec2::new(delta.x, -delta.y) / JOYSTICK_RADIUS;
        if axis.length() > 1.0 {
            axis.normalize()
        } else {
            axis
        }
    }
}

fn track_virtual_joystick(
    touches: Res<Touches>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut stick: ResMut<VirtualJoystick>,
) {
    if let Some(touch) = touches.iter().next() {
        if stick.origin.is_none() {
            stick.origin = Some(touch.start_position());
        }
        stick.current = touch.position();
        return;
    }

    let cursor = windows.get_single().ok().and_then(|w| w.cursor_position());
    match cursor {
        Some(position) if mouse.pressed(MouseButton::Left) => {
            if mouse.just_pressed(MouseButton::Left) || stick.origin.is_none() {
                stick.origin = Some(position);
            }
            stick.current = position;
        }
        _ => stick.origin = None,
    }
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    stick: Res<VirtualJoystick>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    let mut axis = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        axis.x += 1.0;
    }

    input.move_axis = if axis != Vec2::ZERO {
        axis.normalize()
    } else {
        stick.axis()
    };

    input.quicksave = keys.just_pressed(KeyCode::F5);
    input.pause = keys.just_pressed(KeyCode::Escape) || keys.just_pressed(KeyCode::KeyP);
    input.toggle_settings = keys.just_pressed(KeyCode::Tab);
}
