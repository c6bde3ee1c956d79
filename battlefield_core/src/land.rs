use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize, Serializer};

use crate::{
    grid::{BattlefieldDimensions, TilePosition},
    terrain::{TerrainDefinition, TerrainKind},
};

/// Identifier for a player taking part in the battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Lawful,
    Neutral,
    Chaotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Orc,
    Undead,
}

impl Race {
    /// Title of the hero that leads this race onto the battlefield.
    pub fn hero_title(self) -> &'static str {
        match self {
            Race::Human => "Warlord",
            Race::Elf => "Ranger",
            Race::Dwarf => "Hammerlord",
            Race::Orc => "Warchief",
            Race::Undead => "Necromancer",
        }
    }
}

/// Roster entry for a player to be placed by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub race: Race,
    pub alignment: Alignment,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Stronghold,
    Barracks,
    MageTower,
    WatchTower,
    Outpost,
    Wall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub race: Race,
    pub hero: bool,
    pub count: u32,
}

impl Unit {
    pub fn hero(name: impl Into<String>, race: Race) -> Self {
        Self {
            name: name.into(),
            race,
            hero: true,
            count: 1,
        }
    }
}

/// Units belonging to one player stationed on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Army {
    pub controlled_by: PlayerId,
    pub units: Vec<Unit>,
}

impl Army {
    pub fn new(controlled_by: PlayerId, units: Vec<Unit>) -> Self {
        Self {
            controlled_by,
            units,
        }
    }
}

/// A single battlefield tile.
///
/// Terrain and buildings are written by generation and construction, and the
/// controller only changes through [`crate::territory`]; armies are moved in
/// and out freely by the turn layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandState {
    position: TilePosition,
    terrain: TerrainKind,
    alignment: Alignment,
    controller: Option<PlayerId>,
    gold_per_turn: u32,
    buildings: Vec<BuildingKind>,
    armies: Vec<Army>,
}

impl LandState {
    pub fn new(position: TilePosition) -> Self {
        Self {
            position,
            terrain: TerrainKind::None,
            alignment: Alignment::Neutral,
            controller: None,
            gold_per_turn: 0,
            buildings: Vec::new(),
            armies: Vec::new(),
        }
    }

    pub fn position(&self) -> TilePosition {
        self.position
    }

    pub fn key(&self) -> String {
        self.position.key()
    }

    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    /// Alignment of the terrain on this tile.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Controlling player, `None` for neutral land.
    pub fn controller(&self) -> Option<PlayerId> {
        self.controller
    }

    pub fn is_neutral(&self) -> bool {
        self.controller.is_none()
    }

    pub fn gold_per_turn(&self) -> u32 {
        self.gold_per_turn
    }

    pub fn buildings(&self) -> &[BuildingKind] {
        &self.buildings
    }

    pub fn has_building(&self, kind: BuildingKind) -> bool {
        self.buildings.contains(&kind)
    }

    pub fn has_stronghold(&self) -> bool {
        self.has_building(BuildingKind::Stronghold)
    }

    pub fn armies(&self) -> &[Army] {
        &self.armies
    }

    pub fn has_army(&self) -> bool {
        !self.armies.is_empty()
    }

    pub fn has_army_of(&self, player: PlayerId) -> bool {
        self.armies.iter().any(|army| army.controlled_by == player)
    }

    /// Station an army here, merging with one the same player already holds.
    pub fn station_army(&mut self, army: Army) {
        match self
            .armies
            .iter_mut()
            .find(|existing| existing.controlled_by == army.controlled_by)
        {
            Some(existing) => existing.units.extend(army.units),
            None => self.armies.push(army),
        }
    }

    /// Remove and return the army `player` keeps on this tile.
    pub fn withdraw_army(&mut self, player: PlayerId) -> Option<Army> {
        let idx = self
            .armies
            .iter()
            .position(|army| army.controlled_by == player)?;
        Some(self.armies.remove(idx))
    }

    pub(crate) fn set_terrain(&mut self, definition: &TerrainDefinition) {
        self.terrain = definition.kind;
        self.alignment = definition.alignment;
    }

    pub(crate) fn set_gold_per_turn(&mut self, gold: u32) {
        self.gold_per_turn = gold;
    }

    pub(crate) fn set_controller(&mut self, controller: Option<PlayerId>) {
        self.controller = controller;
    }

    pub(crate) fn add_building(&mut self, kind: BuildingKind) {
        self.buildings.push(kind);
    }

    pub(crate) fn clear_buildings(&mut self) -> Vec<BuildingKind> {
        std::mem::take(&mut self.buildings)
    }
}

/// Every tile of a battlefield keyed by position.
///
/// Iteration is row-major, which keeps seeded generation reproducible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattlefieldMap {
    dimensions: BattlefieldDimensions,
    #[serde(serialize_with = "serialize_lands_by_key")]
    lands: BTreeMap<TilePosition, LandState>,
}

impl BattlefieldMap {
    /// Allocate every valid tile as neutral, unshaped land with no yield.
    pub fn new(dimensions: BattlefieldDimensions) -> Self {
        let lands = dimensions
            .positions()
            .map(|pos| (pos, LandState::new(pos)))
            .collect();
        Self { dimensions, lands }
    }

    pub fn dimensions(&self) -> BattlefieldDimensions {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.lands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lands.is_empty()
    }

    pub fn land(&self, pos: TilePosition) -> Option<&LandState> {
        self.lands.get(&pos)
    }

    pub fn land_mut(&mut self, pos: TilePosition) -> Option<&mut LandState> {
        self.lands.get_mut(&pos)
    }

    /// Look a tile up by its `"{row}-{col}"` key.
    pub fn land_by_key(&self, key: &str) -> Option<&LandState> {
        key.parse::<TilePosition>()
            .ok()
            .and_then(|pos| self.land(pos))
    }

    pub fn lands(&self) -> impl Iterator<Item = &LandState> {
        self.lands.values()
    }

    pub(crate) fn lands_mut(&mut self) -> impl Iterator<Item = &mut LandState> {
        self.lands.values_mut()
    }

    pub fn stronghold_positions(&self, player: PlayerId) -> Vec<TilePosition> {
        self.lands()
            .filter(|land| land.has_stronghold() && land.controller() == Some(player))
            .map(LandState::position)
            .collect()
    }
}

fn serialize_lands_by_key<S>(
    lands: &BTreeMap<TilePosition, LandState>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(lands.iter().map(|(pos, land)| (pos.key(), land)))
}
