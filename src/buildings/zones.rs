//! Zone geometry → occupancy. Turns the player's position into edge-triggered
//! enter/exit reports and keeps each owner's `ZoneOccupancy` current.

use bevy::prelude::*;

use crate::shared::*;
use super::construction::ConstructionSite;
use super::workshop::Workshop;

/// Compare the player against every live zone and report edges only.
///
/// Input and output zones are live once their owner is operational; site
/// zones only until then. A zone whose owner is gone is despawned.
pub fn detect_zone_transitions(
    mut commands: Commands,
    player: Query<(Entity, &Transform), With<Player>>,
    mut zones: Query<(Entity, &mut TriggerZone, &Transform), Without<Player>>,
    owners: Query<Has<Workshop>>,
    mut events: EventWriter<ZoneEvent>,
) {
    let Ok((actor, actor_tf)) = player.get_single() else {
        return;
    };
    let position = actor_tf.translation.truncate();

    for (zone_entity, mut zone, zone_tf) in &mut zones {
        let Ok(operational) = owners.get(zone.owner) else {
            commands.entity(zone_entity).despawn();
            continue;
        };
        let live = match zone.kind {
            ZoneKind::Input | ZoneKind::Output => operational,
            ZoneKind::Site => !operational,
        };
        let inside = live && zone.contains(zone_tf.translation.truncate(), position);
        if inside == zone.actor_inside {
            continue;
        }
        zone.actor_inside = inside;

        if inside {
            events.send(ZoneEvent::Entered {
                owner: zone.owner,
                kind: zone.kind,
                actor,
                position,
            });
        } else {
            events.send(ZoneEvent::Exited {
                owner: zone.owner,
                kind: zone.kind,
            });
        }
    }
}

/// Forward zone edges to the owner's occupancy. When the actor leaves the
/// last zone of an owner, every routine on it is cancelled.
pub fn apply_zone_events(
    mut events: EventReader<ZoneEvent>,
    mut owners: Query<(
        &mut ZoneOccupancy,
        Option<&mut Workshop>,
        Option<&mut ConstructionSite>,
    )>,
    mut fx_events: EventWriter<BuildingFxEvent>,
) {
    for event in events.read() {
        match *event {
            ZoneEvent::Entered {
                owner,
                kind,
                actor,
                position,
            } => {
                if let Ok((mut occupancy, _, _)) = owners.get_mut(owner) {
                    occupancy.actor_entered(kind, actor, position);
                }
            }
            ZoneEvent::Exited { owner, kind } => {
                let Ok((mut occupancy, workshop, site)) = owners.get_mut(owner) else {
                    continue;
                };
                if !occupancy.actor_exited(kind) {
                    continue;
                }

                let mut fx = Vec::new();
                if let Some(mut workshop) = workshop {
                    workshop.on_actor_left(&mut fx);
                }
                if let Some(mut site) = site {
                    site.cancel(&mut fx);
                }
                for request in fx {
                    fx_events.send(BuildingFxEvent { owner, request });
                }
            }
        }
    }
}

/// Recompute `is_moving` for every engaged occupancy from the actor's last
/// two positions and the frame time between them.
pub fn sample_actor_movement(
    time: Res<Time>,
    mut occupancies: Query<&mut ZoneOccupancy>,
    actors: Query<&Transform>,
) {
    let dt = time.delta_secs();
    for mut occupancy in &mut occupancies {
        let Some(actor) = occupancy.actor else {
            continue;
        };
        let Ok(actor_tf) = actors.get(actor) else {
            continue;
        };
        occupancy.sample(actor_tf.translation.truncate(), dt, MOVEMENT_SPEED_THRESHOLD);
    }
}
