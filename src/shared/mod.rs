//! Shared components, resources, events, and states for Forgeyard.
//!
//! This is the type contract. Every domain plugin imports from here; a
//! domain reaches into another only through that domain's public re-exports.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

mod ledger;
mod zones;

pub use ledger::{ResourceKind, ResourceLedger};
pub use zones::{ZoneKind, ZoneOccupancy};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCE CATALOG
// ═══════════════════════════════════════════════════════════════════════

/// Name of the synthetic save entry that carries a construction site's hit
/// count. Never a valid catalog name.
pub const CONSTRUCTION_HITS_ENTRY: &str = "ConstructionHits";

#[derive(Debug, Clone)]
pub struct ResourceDef {
    pub kind: ResourceKind,
    pub display_name: String,
    pub color: Color,
}

/// Every resource kind known to this build, in authoring order.
#[derive(Resource, Debug, Clone, Default)]
pub struct ResourceCatalog {
    pub defs: Vec<ResourceDef>,
}

impl ResourceCatalog {
    /// Register a kind. Duplicate and reserved names are refused.
    pub fn register(&mut self, name: &str, display_name: &str, color: Color) -> bool {
        if name == CONSTRUCTION_HITS_ENTRY {
            warn!("Resource name '{}' is reserved", name);
            return false;
        }
        if self.get(name).is_some() {
            warn!("Resource '{}' registered twice; keeping the first", name);
            return false;
        }
        self.defs.push(ResourceDef {
            kind: ResourceKind::new(name),
            display_name: display_name.to_string(),
            color,
        });
        true
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDef> {
        self.defs.iter().find(|d| d.kind.name() == name)
    }

    /// Resolve a persisted name back to a live kind.
    pub fn resolve(&self, name: &str) -> Option<ResourceKind> {
        self.get(name).map(|d| d.kind.clone())
    }

    pub fn display_name<'a>(&'a self, kind: &'a ResourceKind) -> &'a str {
        self.get(kind.name())
            .map(|d| d.display_name.as_str())
            .unwrap_or(kind.name())
    }

    pub fn color(&self, kind: &ResourceKind) -> Color {
        self.get(kind.name()).map(|d| d.color).unwrap_or(Color::WHITE)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER INVENTORY
// ═══════════════════════════════════════════════════════════════════════

/// The player's ledger, shared by every building. Only mutated from the
/// Update schedule, so plain `ResMut` access is all the coordination needed.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInventory {
    pub ledger: ResourceLedger,
}

// ═══════════════════════════════════════════════════════════════════════
// BUILDINGS
// ═══════════════════════════════════════════════════════════════════════

/// Generated-once identifier that survives save/load.
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub String);

impl BuildingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random 128-bit id rendered as 32 hex characters.
    pub fn generate() -> Self {
        let bits: u128 = rand::thread_rng().gen();
        Self(format!("{:032x}", bits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static description of a building entity: its label and the world points
/// resource flights start from / land on.
#[derive(Component, Debug, Clone)]
pub struct Building {
    pub label: String,
    pub input_point: Vec2,
    pub output_point: Vec2,
}

/// Axis-aligned trigger rectangle owned by a building or harvest node. Lives
/// on its own entity; its `Transform` is the zone centre in world space.
#[derive(Component, Debug, Clone)]
pub struct TriggerZone {
    pub owner: Entity,
    pub kind: ZoneKind,
    pub half_extents: Vec2,
    /// The actor was inside on the last detection pass.
    pub actor_inside: bool,
}

impl TriggerZone {
    pub fn new(owner: Entity, kind: ZoneKind, half_extents: Vec2) -> Self {
        Self {
            owner,
            kind,
            half_extents,
            actor_inside: false,
        }
    }

    pub fn contains(&self, centre: Vec2, point: Vec2) -> bool {
        (point - centre).abs().cmple(self.half_extents).all()
    }
}

/// Zone detection, occupancy updates and movement sampling. Everything that
/// reads `ZoneOccupancy` runs after this set.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneSystems;

/// What a per-tick routine reports back to its driving system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineStatus {
    /// Not started, or cancelled.
    Idle,
    /// Active but waiting this tick (actor moving, flight or cooldown pending).
    Suspended,
    /// Made progress this tick.
    Running,
    /// Finished this tick. Reported once.
    Completed,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone, Copy)]
pub struct Player;

#[derive(Component, Debug, Clone)]
pub struct PlayerMovement {
    pub speed: f32,
    pub is_moving: bool,
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            is_moving: false,
        }
    }
}

/// Game actions derived from hardware input, rebuilt every frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// Unit-length (or zero) movement direction.
    pub move_axis: Vec2,
    pub quicksave: bool,
    pub pause: bool,
    pub toggle_settings: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Edge-triggered zone report from the zone geometry.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum ZoneEvent {
    Entered {
        owner: Entity,
        kind: ZoneKind,
        actor: Entity,
        position: Vec2,
    },
    Exited {
        owner: Entity,
        kind: ZoneKind,
    },
}

/// Fire-and-forget request for the visual layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FxRequest {
    FlyResource {
        kind: ResourceKind,
        from: Vec2,
        to: Vec2,
        duration_secs: f32,
    },
    CancelFlight,
    Progress(f32),
    HideProgress,
}

#[derive(Event, Debug, Clone)]
pub struct BuildingFxEvent {
    pub owner: Entity,
    pub request: FxRequest,
}

/// A construction site turned operational. Sent exactly once per building.
#[derive(Event, Debug, Clone)]
pub struct ConstructionCompletedEvent {
    pub building: Entity,
    pub building_id: BuildingId,
}

/// A harvest node was exhausted and paid out.
#[derive(Event, Debug, Clone)]
pub struct NodeHarvestedEvent {
    pub kind: ResourceKind,
    pub amount: u32,
}

#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 16.0;
pub const PIXEL_SCALE: f32 = 3.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

/// Player walking speed in world pixels per second.
pub const PLAYER_SPEED: f32 = 80.0;
/// Speed in world pixels per second above which the actor counts as moving.
/// Measured per second so the result does not depend on the frame rate.
pub const MOVEMENT_SPEED_THRESHOLD: f32 = 8.0;
/// Resource flights travel this many world pixels per second.
pub const RESOURCE_FLY_SPEED: f32 = 80.0;
/// Peak height of the flight arc.
pub const RESOURCE_FLY_HEIGHT: f32 = 24.0;
/// Flights start this far above the actor's feet.
pub const ACTOR_CARRY_OFFSET: Vec2 = Vec2::new(0.0, 8.0);
pub const DEFAULT_TRANSFER_DELAY_SECS: f32 = 0.5;
pub const PROGRESS_BAR_OFFSET: Vec2 = Vec2::new(0.0, 28.0);
/// Virtual joystick radius in logical screen pixels.
pub const JOYSTICK_RADIUS: f32 = 60.0;

pub const Z_GROUND: f32 = 0.0;
pub const Z_BUILDING: f32 = 5.0;
pub const Z_PLAYER: f32 = 10.0;
pub const Z_FX: f32 = 20.0;
