use bevy::prelude::*;
use crate::shared::*;
use super::UiFontHandle;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

/// Column holding one text row per carried resource.
#[derive(Component)]
pub struct HudInventoryList;

#[derive(Component)]
pub struct HudInventoryRow;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(
    mut commands: Commands,
    existing: Query<Entity, With<HudRoot>>,
    font_handle: Res<UiFontHandle>,
) {
    // Guard: resuming from Paused re-enters Playing.
    if !existing.is_empty() {
        return;
    }

    commands
        .spawn((
            HudRoot,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Px(12.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(8.0)),
                row_gap: Val::Px(4.0),
                min_width: Val::Px(140.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.55)),
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Inventory"),
                TextFont {
                    font: font_handle.0.clone(),
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.6)),
                PickingBehavior::IGNORE,
            ));
            parent.spawn((
                HudInventoryList,
                Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(2.0),
                    ..default()
                },
                PickingBehavior::IGNORE,
            ));
        });
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

/// "Display Name  xN" for every carried kind, in catalog order. Kinds the
/// catalog does not know are listed last by name.
pub fn inventory_lines(ledger: &ResourceLedger, catalog: &ResourceCatalog) -> Vec<(String, Color)> {
    let mut lines: Vec<(String, Color)> = catalog
        .defs
        .iter()
        .filter_map(|def| {
            let count = ledger.count(&def.kind);
            (count > 0).then(|| (format!("{}  x{}", def.display_name, count), def.color))
        })
        .collect();
    lines.extend(
        ledger
            .positive()
            .filter(|(kind, _)| catalog.get(kind.name()).is_none())
            .map(|(kind, count)| (format!("{}  x{}", kind, count), Color::WHITE)),
    );
    lines
}

/// Rebuild the list only when the inventory changed.
pub fn update_inventory_hud(
    mut commands: Commands,
    inventory: Res<PlayerInventory>,
    catalog: Res<ResourceCatalog>,
    font_handle: Res<UiFontHandle>,
    list_query: Query<Entity, With<HudInventoryList>>,
    rows: Query<Entity, With<HudInventoryRow>>,
    mut hud_ready: Local<bool>,
) {
    let Ok(list) = list_query.get_single() else {
        return;
    };
    // First frame with a HUD always draws.
    if *hud_ready && !inventory.is_changed() {
        return;
    }
    *hud_ready = true;

    for row in &rows {
        commands.entity(row).despawn_recursive();
    }

    let lines = inventory_lines(&inventory.ledger, &catalog);
    commands.entity(list).with_children(|parent| {
        if lines.is_empty() {
            parent.spawn((
                HudInventoryRow,
                Text::new("(empty)"),
                TextFont {
                    font: font_handle.0.clone(),
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.6, 0.6)),
                PickingBehavior::IGNORE,
            ));
        }
        for (line, color) in lines {
            parent.spawn((
                HudInventoryRow,
                Text::new(line),
                TextFont {
                    font: font_handle.0.clone(),
                    font_size: 12.0,
                    ..default()
                },
                TextColor(color),
                PickingBehavior::IGNORE,
            ));
        }
    });
}
