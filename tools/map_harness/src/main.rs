use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use battlefield_core::{
    distance, load_battlefield_presets_from_env, load_terrain_catalog_from_env, render_ascii,
    render_ownership, seed_from_label, BattlefieldGenerator, BattlefieldPresets, BattlefieldSize,
    GeneratedBattlefield, PlayerProfile, TerrainCatalog, TerrainKind,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Battlefield generation harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one battlefield and print it
    Generate {
        #[command(flatten)]
        setup: Setup,

        /// Generation seed
        #[arg(long, conflicts_with = "seed_label")]
        seed: Option<u64>,

        /// Derive the seed from a label instead (e.g. a match name)
        #[arg(long)]
        seed_label: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Ascii)]
        format: Format,
    },
    /// Generate many seeds in parallel and check the placement invariants
    Sweep {
        #[command(flatten)]
        setup: Setup,

        /// First seed of the sweep
        #[arg(long, default_value_t = 0)]
        start: u64,

        /// Number of seeds to generate
        #[arg(long, default_value_t = 100)]
        count: u64,
    },
}

#[derive(Args, Debug)]
struct Setup {
    /// Battlefield size class (small, medium, large, huge)
    #[arg(long, default_value = "medium")]
    size: BattlefieldSize,

    /// Player roster JSON (array of player profiles)
    #[arg(long)]
    players: Option<PathBuf>,

    /// Override battlefield presets JSON (defaults to BATTLEFIELD_PRESETS_PATH or builtin)
    #[arg(long)]
    presets: Option<PathBuf>,

    /// Override terrain catalog JSON (defaults to TERRAIN_CATALOG_PATH or builtin)
    #[arg(long)]
    terrain: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Ascii,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            setup,
            seed,
            seed_label,
            format,
        } => {
            let seed = match (seed, seed_label.as_deref()) {
                (Some(seed), _) => seed,
                (None, Some(label)) => seed_from_label(label),
                (None, None) => 0,
            };
            let presets = load_presets(setup.presets.as_deref())?;
            let generator = build_generator(&setup, &presets)?;
            let generated = generator
                .generate_seeded(seed)
                .with_context(|| format!("Generation failed for seed {seed}"))?;
            match format {
                Format::Ascii => print_ascii(&generated, setup.size, seed),
                Format::Json => print_json(&generated, setup.size, seed)?,
            }
        }
        Command::Sweep {
            setup,
            start,
            count,
        } => {
            let presets = load_presets(setup.presets.as_deref())?;
            let generator = build_generator(&setup, &presets)?;
            let min_distance = presets.generation().homeland_relaxed_distance;
            sweep(&generator, start, count, min_distance)?;
        }
    }
    Ok(())
}

fn build_generator(setup: &Setup, presets: &BattlefieldPresets) -> Result<BattlefieldGenerator> {
    let catalog = load_catalog(setup.terrain.as_deref())?;
    let players = match &setup.players {
        Some(path) => load_roster(path)?,
        None => Vec::new(),
    };
    let generator = BattlefieldGenerator::from_preset(presets, setup.size)
        .with_context(|| format!("No preset for size '{}'", setup.size))?
        .with_catalog(catalog)
        .with_players(players);
    Ok(generator)
}

fn load_presets(path: Option<&Path>) -> Result<Arc<BattlefieldPresets>> {
    match path {
        Some(path) => BattlefieldPresets::from_file(path)
            .map(Arc::new)
            .with_context(|| format!("Failed to load presets from {}", path.display())),
        None => Ok(load_battlefield_presets_from_env()),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Arc<TerrainCatalog>> {
    match path {
        Some(path) => TerrainCatalog::from_file(path)
            .map(Arc::new)
            .with_context(|| format!("Failed to load terrain catalog from {}", path.display())),
        None => Ok(load_terrain_catalog_from_env()),
    }
}

fn load_roster(path: &Path) -> Result<Vec<PlayerProfile>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster at {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse roster JSON at {}", path.display()))
}

fn print_ascii(generated: &GeneratedBattlefield, size: BattlefieldSize, seed: u64) {
    println!(
        "=== {} battlefield {} (seed {}) ===",
        size,
        generated.map.dimensions(),
        seed
    );
    println!("{}", render_ascii(&generated.map));
    if !generated.homelands.is_empty() {
        println!("=== ownership ===");
        println!("{}", render_ownership(&generated.map));
        for home in &generated.homelands {
            println!(
                "player {}: stronghold {} barracks {}",
                home.player, home.stronghold, home.barracks
            );
        }
    }
}

fn print_json(generated: &GeneratedBattlefield, size: BattlefieldSize, seed: u64) -> Result<()> {
    let report = json!({
        "size": size,
        "seed": seed,
        "dimensions": generated.map.dimensions(),
        "volcano": generated.volcano,
        "homelands": generated.homelands,
        "map": generated.map,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Problems found on one generated battlefield.
fn check_invariants(generated: &GeneratedBattlefield, min_distance: u32) -> Vec<String> {
    let map = &generated.map;
    let mut problems = Vec::new();

    let volcanoes = map
        .lands()
        .filter(|land| land.terrain() == TerrainKind::Volcano)
        .count();
    if volcanoes != 1 {
        problems.push(format!("{volcanoes} volcanoes"));
    }
    let unshaped = map
        .lands()
        .filter(|land| land.terrain() == TerrainKind::None)
        .count();
    if unshaped > 0 {
        problems.push(format!("{unshaped} unshaped tiles"));
    }

    for (idx, home) in generated.homelands.iter().enumerate() {
        if map.stronghold_positions(home.player).len() != 1 {
            problems.push(format!("player {} does not hold exactly one stronghold", home.player));
        }
        for other in &generated.homelands[idx + 1..] {
            match distance(map.dimensions(), home.stronghold, other.stronghold) {
                Some(hexes) if hexes >= min_distance => {}
                found => problems.push(format!(
                    "players {} and {} are {:?} apart",
                    home.player, other.player, found
                )),
            }
        }
    }
    problems
}

/// Seeds `start..start + count`, cut short at `u64::MAX`.
fn seed_range(start: u64, count: u64) -> Range<u64> {
    start..start.saturating_add(count)
}

fn sweep(
    generator: &BattlefieldGenerator,
    start: u64,
    count: u64,
    min_distance: u32,
) -> Result<()> {
    let results: Vec<(u64, Result<Vec<String>, String>)> = seed_range(start, count)
        .into_par_iter()
        .map(|seed| {
            let outcome = generator
                .generate_seeded(seed)
                .map(|generated| check_invariants(&generated, min_distance))
                .map_err(|err| err.to_string());
            (seed, outcome)
        })
        .collect();

    let mut failures = Vec::new();
    for (seed, outcome) in &results {
        match outcome {
            Ok(problems) if problems.is_empty() => {}
            Ok(problems) => failures.push(json!({ "seed": seed, "problems": problems })),
            Err(error) => failures.push(json!({ "seed": seed, "error": error })),
        }
    }
    tracing::info!(
        target: "battlefield::harness",
        dimensions = %generator.dimensions(),
        seeds = results.len(),
        failures = failures.len(),
        "harness.sweep.finished"
    );

    let summary = json!({
        "dimensions": generator.dimensions(),
        "start": start,
        "count": results.len(),
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if !failures.is_empty() {
        anyhow::bail!("{} of {} seeds broke an invariant", failures.len(), results.len());
    }
    Ok(())
}
