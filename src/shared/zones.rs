use bevy::prelude::*;

/// Which side of a building a trigger zone belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    /// Player → building deliveries.
    Input,
    /// Building → player pickups.
    Output,
    /// Footprint of a construction site or harvest node.
    Site,
}

/// Per-owner view of the actor standing in its zones.
///
/// The three flags are independent (zones may overlap). The actor handle and
/// the movement baseline are captured on every enter and released once the
/// last flag clears.
#[derive(Component, Debug, Clone, Default)]
pub struct ZoneOccupancy {
    pub in_input: bool,
    pub in_output: bool,
    pub in_site: bool,
    pub is_moving: bool,
    pub actor: Option<Entity>,
    last_position: Vec2,
}

impl ZoneOccupancy {
    pub fn actor_entered(&mut self, kind: ZoneKind, actor: Entity, position: Vec2) {
        match kind {
            ZoneKind::Input => self.in_input = true,
            ZoneKind::Output => self.in_output = true,
            ZoneKind::Site => self.in_site = true,
        }
        self.actor = Some(actor);
        self.last_position = position;
        self.is_moving = false;
    }

    /// Clear the flag for `kind`. Returns true when this was the last zone the
    /// actor occupied, meaning the actor has been released and the owner must
    /// cancel whatever it was doing.
    pub fn actor_exited(&mut self, kind: ZoneKind) -> bool {
        match kind {
            ZoneKind::Input => self.in_input = false,
            ZoneKind::Output => self.in_output = false,
            ZoneKind::Site => self.in_site = false,
        }
        if self.in_any() || self.actor.is_none() {
            return false;
        }
        self.actor = None;
        self.is_moving = false;
        true
    }

    /// Recompute `is_moving` from the previous sample and this one only.
    ///
    /// `dt` is the time between the two samples. With no elapsed time any
    /// displacement at all counts as movement.
    pub fn sample(&mut self, position: Vec2, dt: f32, min_speed: f32) -> bool {
        let distance = self.last_position.distance(position);
        self.is_moving = if dt > 0.0 {
            distance / dt > min_speed
        } else {
            distance > f32::EPSILON
        };
        self.last_position = position;
        self.is_moving
    }

    pub fn in_any(&self) -> bool {
        self.in_input || self.in_output || self.in_site
    }

    /// An actor is present in at least one zone.
    pub fn is_engaged(&self) -> bool {
        self.actor.is_some() && self.in_any()
    }

    /// Engaged and standing still: the gate every routine checks each tick.
    pub fn is_settled(&self) -> bool {
        self.is_engaged() && !self.is_moving
    }

    pub fn last_position(&self) -> Vec2 {
        self.last_position
    }
}
