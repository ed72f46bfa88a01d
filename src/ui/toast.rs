use bevy::prelude::*;
use crate::save::{LoadCompleteEvent, SaveCompleteEvent};
use crate::shared::*;
use super::UiFontHandle;

const MAX_VISIBLE_TOASTS: usize = 3;
const FADE_SECS: f32 = 0.5;

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Marker for the toast container node (top-center of screen).
#[derive(Component)]
pub struct ToastContainer;

#[derive(Component)]
pub struct ToastItem {
    pub timer: Timer,
    /// Set once the display time ran out.
    pub fade_timer: Option<Timer>,
}

impl ToastItem {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            timer: Timer::from_seconds(duration_secs, TimerMode::Once),
            fade_timer: None,
        }
    }

    /// Advance by `delta`. Returns the remaining opacity, or `None` once the
    /// toast has fully faded.
    pub fn advance(&mut self, delta: std::time::Duration) -> Option<f32> {
        match self.fade_timer.as_mut() {
            None => {
                self.timer.tick(delta);
                if self.timer.just_finished() {
                    self.fade_timer = Some(Timer::from_seconds(FADE_SECS, TimerMode::Once));
                }
                Some(1.0)
            }
            Some(fade) => {
                fade.tick(delta);
                if fade.finished() {
                    None
                } else {
                    Some(1.0 - fade.fraction())
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN CONTAINER
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_toast_container(mut commands: Commands) {
    commands.spawn((
        ToastContainer,
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(60.0),
            left: Val::Percent(50.0),
            width: Val::Px(320.0),
            // Half the width, so the column is centred on the screen.
            margin: UiRect {
                left: Val::Px(-160.0),
                ..default()
            },
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(6.0),
            align_items: AlignItems::Center,
            ..default()
        },
        PickingBehavior::IGNORE,
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// HANDLE TOAST EVENTS — spawn a child node per event
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_toast_events(
    mut commands: Commands,
    mut events: EventReader<ToastEvent>,
    font_handle: Res<UiFontHandle>,
    container_query: Query<Entity, With<ToastContainer>>,
    existing_toasts: Query<Entity, With<ToastItem>>,
) {
    let Ok(container) = container_query.get_single() else {
        return;
    };

    let mut visible: Vec<Entity> = existing_toasts.iter().collect();
    for event in events.read() {
        // Oldest goes first when the column is full.
        if visible.len() >= MAX_VISIBLE_TOASTS {
            let oldest = visible.remove(0);
            commands.entity(oldest).despawn_recursive();
        }

        let toast_entity = commands
            .spawn((
                ToastItem::new(event.duration_secs),
                Node {
                    padding: UiRect {
                        left: Val::Px(12.0),
                        right: Val::Px(12.0),
                        top: Val::Px(5.0),
                        bottom: Val::Px(5.0),
                    },
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.75)),
                BorderColor(Color::srgba(0.5, 0.5, 0.5, 0.5)),
                PickingBehavior::IGNORE,
            ))
            .with_children(|parent| {
                parent.spawn((
                    Text::new(event.message.clone()),
                    TextFont {
                        font: font_handle.0.clone(),
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    PickingBehavior::IGNORE,
                ));
            })
            .id();

        commands.entity(container).add_child(toast_entity);
        visible.push(toast_entity);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE TOASTS — tick timers, fade out, despawn
// ═══════════════════════════════════════════════════════════════════════

pub fn update_toasts(
    mut commands: Commands,
    time: Res<Time>,
    mut toast_query: Query<(Entity, &mut ToastItem, &mut BackgroundColor, &Children)>,
    mut text_color_query: Query<&mut TextColor>,
) {
    for (entity, mut toast, mut bg_color, children) in &mut toast_query {
        let Some(alpha) = toast.advance(time.delta()) else {
            commands.entity(entity).despawn_recursive();
            continue;
        };
        if toast.fade_timer.is_none() {
            continue;
        }

        bg_color.0 = bg_color.0.with_alpha(0.75 * alpha);
        for &child in children.iter() {
            if let Ok(mut text_color) = text_color_query.get_mut(child) {
                text_color.0 = text_color.0.with_alpha(alpha);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENT-TO-TOAST WIRING SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn wire_save_toasts(
    mut save_events: EventReader<SaveCompleteEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for event in save_events.read() {
        let message = if event.success {
            "Game saved".to_string()
        } else {
            format!(
                "Save failed: {}",
                event.error_message.as_deref().unwrap_or("unknown error")
            )
        };
        toast_writer.send(ToastEvent {
            message,
            duration_secs: 2.0,
        });
    }
}

pub fn wire_load_toasts(
    mut load_events: EventReader<LoadCompleteEvent>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for event in load_events.read() {
        // A fresh start with no save file is not worth a toast.
        if event.success && event.buildings_restored == 0 {
            continue;
        }
        let message = if event.success {
            format!("Save loaded ({} buildings)", event.buildings_restored)
        } else {
            format!(
                "Load failed: {}",
                event.error_message.as_deref().unwrap_or("unknown error")
            )
        };
        toast_writer.send(ToastEvent {
            message,
            duration_secs: 3.0,
        });
    }
}

pub fn wire_harvest_toasts(
    mut harvested: EventReader<NodeHarvestedEvent>,
    catalog: Res<ResourceCatalog>,
    mut toast_writer: EventWriter<ToastEvent>,
) {
    for event in harvested.read() {
        toast_writer.send(ToastEvent {
            message: format!("+{} {}", event.amount, catalog.display_name(&event.kind)),
            duration_secs: 1.5,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_harvest_event_becomes_toast_with_display_name() {
        let mut app = App::new();
        let mut catalog = ResourceCatalog::default();
        catalog.register("wood", "Wood", Color::WHITE);
        app.insert_resource(catalog)
            .add_event::<NodeHarvestedEvent>()
            .add_event::<ToastEvent>()
            .add_systems(Update, wire_harvest_toasts);

        app.world_mut().send_event(NodeHarvestedEvent {
            kind: ResourceKind::new("wood"),
            amount: 3,
        });
        app.update();

        let toasts = app.world().resource::<Events<ToastEvent>>();
        let messages: Vec<&str> = toasts
            .iter_current_update_events()
            .map(|toast| toast.message.as_str())
            .collect();
        assert_eq!(messages, vec!["+3 Wood"]);
    }

    #[test]
    fn test_toast_fades_after_display_time() {
        let mut toast = ToastItem::new(1.0);
        assert_eq!(toast.advance(Duration::from_millis(500)), Some(1.0));
        assert!(toast.fade_timer.is_none());

        assert_eq!(toast.advance(Duration::from_millis(500)), Some(1.0));
        assert!(toast.fade_timer.is_some());

        let alpha = toast.advance(Duration::from_millis(250));
        assert!(alpha.is_some_and(|a| (a - 0.5).abs() < 1e-4));

        assert_eq!(toast.advance(Duration::from_millis(250)), None);
    }
}
