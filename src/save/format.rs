//! On-disk shape of a save and the mapping between it and live ledgers.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::{ConstructionSite, Workshop};
use crate::shared::*;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSaveData {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub player_inventory: Vec<ResourceSaveData>,
    #[serde(default)]
    pub buildings: Vec<BuildingSaveData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSaveData {
    pub building_id: String,
    pub is_constructed: bool,
    #[serde(default)]
    pub stored_resources: Vec<ResourceSaveData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSaveData {
    pub resource_name: String,
    pub amount: u32,
}

impl ResourceSaveData {
    pub fn new(resource_name: impl Into<String>, amount: u32) -> Self {
        Self {
            resource_name: resource_name.into(),
            amount,
        }
    }
}

/// Positive entries only, in name order.
pub fn ledger_records(ledger: &ResourceLedger) -> Vec<ResourceSaveData> {
    ledger
        .positive()
        .map(|(kind, amount)| ResourceSaveData::new(kind.name(), amount))
        .collect()
}

/// Rebuild a ledger from saved entries. Names the catalog no longer knows
/// are skipped and returned; the hit-count entry is never a resource.
pub fn restore_ledger(
    records: &[ResourceSaveData],
    catalog: &ResourceCatalog,
) -> (ResourceLedger, Vec<String>) {
    let mut ledger = ResourceLedger::new();
    let mut unknown = Vec::new();
    for record in records {
        if record.resource_name == CONSTRUCTION_HITS_ENTRY {
            continue;
        }
        match catalog.resolve(&record.resource_name) {
            Some(kind) => ledger.add(&kind, record.amount),
            None => unknown.push(record.resource_name.clone()),
        }
    }
    (ledger, unknown)
}

/// Saved hit count of a construction site, if the record carries one.
pub fn saved_hits(records: &[ResourceSaveData]) -> Option<u32> {
    records
        .iter()
        .find(|r| r.resource_name == CONSTRUCTION_HITS_ENTRY)
        .map(|r| r.amount)
}

pub fn serialize_workshop(id: &BuildingId, workshop: &Workshop) -> BuildingSaveData {
    BuildingSaveData {
        building_id: id.as_str().to_string(),
        is_constructed: true,
        stored_resources: ledger_records(&workshop.stored),
    }
}

pub fn serialize_site(id: &BuildingId, site: &ConstructionSite) -> BuildingSaveData {
    let mut stored_resources = ledger_records(site.deposited());
    stored_resources.push(ResourceSaveData::new(CONSTRUCTION_HITS_ENTRY, site.hits()));
    BuildingSaveData {
        building_id: id.as_str().to_string(),
        is_constructed: false,
        stored_resources,
    }
}

/// Whole-game snapshot. Buildings are written in id order so repeated saves
/// of the same state produce the same file.
pub fn snapshot<'a>(
    player: &ResourceLedger,
    buildings: impl IntoIterator<Item = (&'a BuildingId, Option<&'a Workshop>, Option<&'a ConstructionSite>)>,
) -> GameSaveData {
    let mut records: Vec<BuildingSaveData> = buildings
        .into_iter()
        .filter_map(|(id, workshop, site)| match (workshop, site) {
            (Some(workshop), _) => Some(serialize_workshop(id, workshop)),
            (None, Some(site)) => Some(serialize_site(id, site)),
            (None, None) => None,
        })
        .collect();
    records.sort_by(|a, b| a.building_id.cmp(&b.building_id));

    GameSaveData {
        version: SAVE_VERSION,
        player_inventory: ledger_records(player),
        buildings: records,
    }
}

/// Replace the player ledger wholesale with the saved one.
pub fn restore_player(ledger: &mut ResourceLedger, data: &GameSaveData, catalog: &ResourceCatalog) {
    let (restored, unknown) = restore_ledger(&data.player_inventory, catalog);
    for name in unknown {
        warn!("Player inventory: unknown resource '{}' skipped", name);
    }
    ledger.clear();
    for (kind, amount) in restored.positive() {
        ledger.add(kind, amount);
    }
}
