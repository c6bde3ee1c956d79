use std::path::PathBuf;
use std::sync::{Arc, Once};

use battlefield_core::{
    load_battlefield_presets_from_env, BattlefieldGenerator, BattlefieldPresets, BattlefieldSize,
    GeneratedBattlefield, PlayerId, PlayerProfile, TilePosition,
};

static INIT: Once = Once::new();

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let presets_path = fixture("test_battlefield_presets.json");

        debug_assert!(
            presets_path.exists(),
            "missing test battlefield presets at {}",
            presets_path.display()
        );

        std::env::set_var("BATTLEFIELD_PRESETS_PATH", &presets_path);
    });
}

pub fn presets() -> Arc<BattlefieldPresets> {
    ensure_test_config();
    load_battlefield_presets_from_env()
}

/// First `count` players of the fixture roster.
pub fn roster(count: usize) -> anyhow::Result<Vec<PlayerProfile>> {
    let contents = std::fs::read_to_string(fixture("players.json"))?;
    let mut players: Vec<PlayerProfile> = serde_json::from_str(&contents)?;
    players.truncate(count);
    Ok(players)
}

pub fn generate(
    size: BattlefieldSize,
    players: usize,
    seed: u64,
) -> anyhow::Result<GeneratedBattlefield> {
    let generator =
        BattlefieldGenerator::from_preset(&presets(), size)?.with_players(roster(players)?);
    Ok(generator.generate_seeded(seed)?)
}

#[allow(dead_code)]
pub fn stronghold_of(generated: &GeneratedBattlefield, player: PlayerId) -> TilePosition {
    generated
        .homelands
        .iter()
        .find(|home| home.player == player)
        .map(|home| home.stronghold)
        .expect("player was placed")
}
