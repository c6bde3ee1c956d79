//! Spatial and territory engine for the battlefield.
//!
//! Provides hex grid geometry over the clipped offset layout, the land
//! registry queries, seeded battlefield generation and the ownership
//! transitions driven by strongholds and armies.

pub mod grid;
pub mod hashing;
mod homeland;
pub mod land;
pub mod land_registry;
pub mod map_preset;
pub mod mapgen;
pub mod overview;
pub mod terrain;
pub mod territory;

pub use grid::{
    distance, is_valid_position, nearest_stronghold_land, neighbors, shortest_path,
    tiles_in_radius, BattlefieldDimensions, TilePosition, TilePositionParseError,
    DEFAULT_STRONGHOLD_SEARCH_RADIUS,
};
pub use hashing::seed_from_label;
pub use homeland::Homeland;
pub use land::{
    Alignment, Army, BattlefieldMap, BuildingKind, LandState, PlayerId, PlayerProfile, Race, Unit,
};
pub use land_registry::{query_lands, query_positions, ArmyFilter, BuildingFilter, LandFilter};
pub use map_preset::{
    load_battlefield_presets_from_env, BattlefieldPreset, BattlefieldPresets,
    BattlefieldPresetsError, BattlefieldSize, GenerationConfig,
};
pub use mapgen::{validate_battlefield, BattlefieldGenerator, GeneratedBattlefield, MapGenError};
pub use overview::{render_ascii, render_ownership};
pub use terrain::{
    load_terrain_catalog_from_env, TerrainCatalog, TerrainCatalogError, TerrainDefinition,
    TerrainKind, TerrainRole,
};
pub use territory::{
    construct_building, destroy_building, realm, recompute_ownership, Alliances,
    OwnershipReport, TerritoryError, REALM_RADIUS, STRONGHOLD_COLLAPSE_RADIUS,
};
