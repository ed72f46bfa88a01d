use bevy::prelude::*;
use crate::shared::*;

/// Every resource kind in the game. Names are the stable ids written to
/// save files; never rename one that has shipped.
pub fn populate_resources(catalog: &mut ResourceCatalog) {
    let defs: [(&str, &str, Color); 7] = [
        ("wood", "Wood", Color::srgb(0.55, 0.35, 0.17)),
        ("stone", "Stone", Color::srgb(0.6, 0.6, 0.62)),
        ("plank", "Plank", Color::srgb(0.85, 0.65, 0.4)),
        ("brick", "Brick", Color::srgb(0.72, 0.3, 0.22)),
        ("iron_ore", "Iron Ore", Color::srgb(0.45, 0.38, 0.36)),
        ("iron_bar", "Iron Bar", Color::srgb(0.78, 0.8, 0.85)),
        ("tool", "Tool", Color::srgb(0.95, 0.82, 0.3)),
    ];
    for (name, display_name, color) in defs {
        catalog.register(name, display_name, color);
    }
}
