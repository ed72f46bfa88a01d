//! Visual side of the building routines: flying resource sprites, progress
//! bars and the construction-finished tint. Nothing here touches a ledger.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::buildings::Workshop;
use crate::shared::*;

pub struct FxPlugin;

impl Plugin for FxPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                handle_fx_requests,
                animate_flights,
                despawn_orphaned_fx,
                apply_building_tint,
                start_completion_pulse,
                animate_completion_pulse,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}

const FLY_SPRITE_SIZE: f32 = 6.0;
const BAR_WIDTH: f32 = 24.0;
const BAR_HEIGHT: f32 = 3.0;
const PULSE_SECS: f32 = 0.4;

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone)]
pub struct FlyingResource {
    pub owner: Entity,
    pub from: Vec2,
    pub to: Vec2,
    pub elapsed: f32,
    pub duration: f32,
}

/// Background of an owner's progress bar.
#[derive(Component, Debug, Clone)]
pub struct ProgressBar {
    pub owner: Entity,
    pub value: f32,
}

/// The filled part of an owner's progress bar.
#[derive(Component, Debug, Clone)]
pub struct ProgressFill {
    pub owner: Entity,
    /// World x of the bar centre.
    pub centre_x: f32,
}

/// Sprite colours for a building before and after construction.
#[derive(Component, Debug, Clone, Copy)]
pub struct BuildingTint {
    pub scaffold: Color,
    pub built: Color,
}

#[derive(Component, Debug, Clone)]
pub struct CompletionPulse {
    pub timer: Timer,
}

/// Point along a flight arc at `t` in [0, 1].
pub fn arc_point(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    let t = t.clamp(0.0, 1.0);
    from.lerp(to, t) + Vec2::Y * (std::f32::consts::PI * t).sin() * RESOURCE_FLY_HEIGHT
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_fx_requests(
    mut commands: Commands,
    mut events: EventReader<BuildingFxEvent>,
    catalog: Res<ResourceCatalog>,
    owners: Query<&Transform, Without<ProgressFill>>,
    flights: Query<(Entity, &FlyingResource)>,
    mut bars: Query<(Entity, &mut ProgressBar)>,
    mut fills: Query<(Entity, &ProgressFill, &mut Sprite, &mut Transform), Without<ProgressBar>>,
) {
    // Bars spawned by this pass are not visible to the queries yet.
    let mut spawned: HashMap<Entity, (Entity, Entity, Vec2)> = HashMap::new();

    for event in events.read() {
        let owner = event.owner;
        match &event.request {
            FxRequest::FlyResource {
                kind,
                from,
                to,
                duration_secs,
            } => {
                commands.spawn((
                    FlyingResource {
                        owner,
                        from: *from,
                        to: *to,
                        elapsed: 0.0,
                        duration: *duration_secs,
                    },
                    Sprite {
                        color: catalog.color(kind),
                        custom_size: Some(Vec2::splat(FLY_SPRITE_SIZE)),
                        ..default()
                    },
                    Transform::from_translation(from.extend(Z_FX)),
                    Visibility::default(),
                ));
            }
            FxRequest::CancelFlight => {
                for (entity, flight) in &flights {
                    if flight.owner == owner {
                        commands.entity(entity).despawn();
                    }
                }
            }
            FxRequest::Progress(value) => {
                let value = value.clamp(0.0, 1.0);
                if let Some(&(bar_id, fill_id, anchor)) = spawned.get(&owner) {
                    let (sprite, transform) = fill_sprite(anchor, value);
                    commands.entity(bar_id).insert(ProgressBar { owner, value });
                    commands.entity(fill_id).insert((sprite, transform));
                    continue;
                }
                let existing = bars.iter_mut().find(|(_, bar)| bar.owner == owner);
                if let Some((_, mut bar)) = existing {
                    bar.value = value;
                    for (_, fill, mut sprite, mut transform) in &mut fills {
                        if fill.owner == owner {
                            set_fill(&mut sprite, &mut transform, fill.centre_x, value);
                        }
                    }
                    continue;
                }

                let Ok(owner_tf) = owners.get(owner) else {
                    continue;
                };
                let anchor = owner_tf.translation.truncate() + PROGRESS_BAR_OFFSET;
                let bar_id = commands
                    .spawn((
                        ProgressBar { owner, value },
                        Sprite {
                            color: Color::srgba(0.0, 0.0, 0.0, 0.6),
                            custom_size: Some(Vec2::new(BAR_WIDTH, BAR_HEIGHT)),
                            ..default()
                        },
                        Transform::from_translation(anchor.extend(Z_FX)),
                        Visibility::default(),
                    ))
                    .id();
                let (sprite, transform) = fill_sprite(anchor, value);
                let fill_id = commands
                    .spawn((
                        ProgressFill {
                            owner,
                            centre_x: anchor.x,
                        },
                        sprite,
                        transform,
                        Visibility::default(),
                    ))
                    .id();
                spawned.insert(owner, (bar_id, fill_id, anchor));
            }
            FxRequest::HideProgress => {
                if let Some((bar_id, fill_id, _)) = spawned.remove(&owner) {
                    commands.entity(bar_id).despawn();
                    commands.entity(fill_id).despawn();
                }
                for (entity, bar) in &bars {
                    if bar.owner == owner {
                        commands.entity(entity).despawn();
                    }
                }
                for (entity, fill, _, _) in &fills {
                    if fill.owner == owner {
                        commands.entity(entity).despawn();
                    }
                }
            }
        }
    }
}

fn fill_sprite(anchor: Vec2, value: f32) -> (Sprite, Transform) {
    let mut sprite = Sprite {
        color: Color::srgb(0.4, 0.85, 0.3),
        ..default()
    };
    let mut transform = Transform::from_translation(anchor.extend(Z_FX + 0.1));
    set_fill(&mut sprite, &mut transform, anchor.x, value);
    (sprite, transform)
}

/// Size the fill left-aligned inside a bar centred on `centre_x`.
fn set_fill(sprite: &mut Sprite, transform: &mut Transform, centre_x: f32, value: f32) {
    let width = BAR_WIDTH * value;
    sprite.custom_size = Some(Vec2::new(width, BAR_HEIGHT));
    transform.translation.x = centre_x - BAR_WIDTH / 2.0 + width / 2.0;
}

pub fn animate_flights(
    mut commands: Commands,
    time: Res<Time>,
    mut flights: Query<(Entity, &mut FlyingResource, &mut Transform)>,
) {
    for (entity, mut flight, mut transform) in &mut flights {
        flight.elapsed += time.delta_secs();
        if flight.duration <= 0.0 || flight.elapsed >= flight.duration {
            commands.entity(entity).despawn();
            continue;
        }
        let point = arc_point(flight.from, flight.to, flight.elapsed / flight.duration);
        transform.translation.x = point.x;
        transform.translation.y = point.y;
    }
}

/// Bars and flights of owners that no longer exist (harvested nodes).
pub fn despawn_orphaned_fx(
    mut commands: Commands,
    owners: Query<(), With<ZoneOccupancy>>,
    flights: Query<(Entity, &FlyingResource)>,
    bars: Query<(Entity, &ProgressBar)>,
    fills: Query<(Entity, &ProgressFill)>,
) {
    let orphans = flights
        .iter()
        .filter(|(_, f)| owners.get(f.owner).is_err())
        .map(|(e, _)| e)
        .chain(bars.iter().filter(|(_, b)| owners.get(b.owner).is_err()).map(|(e, _)| e))
        .chain(fills.iter().filter(|(_, f)| owners.get(f.owner).is_err()).map(|(e, _)| e));
    for entity in orphans {
        commands.entity(entity).despawn();
    }
}

/// Scaffold colour while under construction, built colour once the building
/// gained its workshop (by construction or by loading a save).
pub fn apply_building_tint(
    mut buildings: Query<
        (&BuildingTint, &mut Sprite, Has<Workshop>),
        Or<(Added<BuildingTint>, Added<Workshop>)>,
    >,
) {
    for (tint, mut sprite, operational) in &mut buildings {
        sprite.color = if operational { tint.built } else { tint.scaffold };
    }
}

pub fn start_completion_pulse(
    mut commands: Commands,
    mut events: EventReader<ConstructionCompletedEvent>,
) {
    for event in events.read() {
        if let Some(mut entity) = commands.get_entity(event.building) {
            entity.insert(CompletionPulse {
                timer: Timer::from_seconds(PULSE_SECS, TimerMode::Once),
            });
        }
    }
}

pub fn animate_completion_pulse(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut CompletionPulse, &mut Transform)>,
) {
    for (entity, mut pulse, mut transform) in &mut query {
        pulse.timer.tick(time.delta());
        let t = pulse.timer.fraction();
        transform.scale = Vec3::splat(1.0 + 0.2 * (std::f32::consts::PI * t).sin());
        if pulse.timer.finished() {
            transform.scale = Vec3::ONE;
            commands.entity(entity).remove::<CompletionPulse>();
        }
    }
}
