//! Plain-text views of a battlefield for logs and the harness.
//!
//! One line per row, tiles separated by a space; odd rows are indented by
//! one character so the hex offset stays visible.

use crate::land::{BattlefieldMap, LandState};

/// Terrain glyphs for every tile.
pub fn render_ascii(map: &BattlefieldMap) -> String {
    render_with(map, |land| land.terrain().glyph())
}

/// Controller of every tile: `.` for neutral land, otherwise the last digit of
/// the player id.
pub fn render_ownership(map: &BattlefieldMap) -> String {
    render_with(map, |land| match land.controller() {
        None => '.',
        Some(player) => char::from_digit(player.0 % 10, 10).unwrap_or('?'),
    })
}

fn render_with(map: &BattlefieldMap, glyph: impl Fn(&LandState) -> char) -> String {
    let dimensions = map.dimensions();
    let mut lines = Vec::with_capacity(dimensions.rows as usize);
    for row in 0..dimensions.rows as i32 {
        let mut line = String::new();
        if row % 2 == 1 {
            line.push(' ');
        }
        let tiles: Vec<String> = map
            .lands()
            .filter(|land| land.position().row == row)
            .map(|land| glyph(land).to_string())
            .collect();
        line.push_str(&tiles.join(" "));
        lines.push(line);
    }
    lines.join("\n")
}
