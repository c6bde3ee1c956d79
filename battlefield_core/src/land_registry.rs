//! Single read path over the battlefield's tiles.
//!
//! Every filter is optional and all present filters must hold. An empty
//! controller list selects neutral land only.

use crate::{
    grid::TilePosition,
    land::{Alignment, BattlefieldMap, BuildingKind, LandState, PlayerId},
    terrain::TerrainKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildingFilter {
    /// No buildings at all.
    None,
    /// At least one building of any kind.
    Any,
    /// At least one building of one of these kinds.
    AnyOf(Vec<BuildingKind>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmyFilter {
    Absent,
    Present,
    OwnedBy(PlayerId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandFilter {
    pub controllers: Option<Vec<PlayerId>>,
    pub terrains: Option<Vec<TerrainKind>>,
    pub alignment: Option<Alignment>,
    pub buildings: Option<BuildingFilter>,
    pub armies: Option<ArmyFilter>,
}

impl LandFilter {
    pub fn controlled_by(mut self, players: impl IntoIterator<Item = PlayerId>) -> Self {
        self.controllers = Some(players.into_iter().collect());
        self
    }

    pub fn neutral(mut self) -> Self {
        self.controllers = Some(Vec::new());
        self
    }

    pub fn terrain_in(mut self, terrains: impl IntoIterator<Item = TerrainKind>) -> Self {
        self.terrains = Some(terrains.into_iter().collect());
        self
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn buildings(mut self, rule: BuildingFilter) -> Self {
        self.buildings = Some(rule);
        self
    }

    pub fn armies(mut self, rule: ArmyFilter) -> Self {
        self.armies = Some(rule);
        self
    }

    pub fn matches(&self, land: &LandState) -> bool {
        if let Some(controllers) = &self.controllers {
            let accepted = match land.controller() {
                None => controllers.is_empty(),
                Some(player) => controllers.contains(&player),
            };
            if !accepted {
                return false;
            }
        }

        if let Some(terrains) = &self.terrains {
            if !terrains.contains(&land.terrain()) {
                return false;
            }
        }

        if let Some(alignment) = self.alignment {
            if land.alignment() != alignment {
                return false;
            }
        }

        if let Some(rule) = &self.buildings {
            let accepted = match rule {
                BuildingFilter::None => land.buildings().is_empty(),
                BuildingFilter::Any => !land.buildings().is_empty(),
                BuildingFilter::AnyOf(kinds) => {
                    land.buildings().iter().any(|kind| kinds.contains(kind))
                }
            };
            if !accepted {
                return false;
            }
        }

        match self.armies {
            None => true,
            Some(ArmyFilter::Absent) => !land.has_army(),
            Some(ArmyFilter::Present) => land.has_army(),
            Some(ArmyFilter::OwnedBy(player)) => land.has_army_of(player),
        }
    }
}

/// Tiles matching `filter`, in row-major order.
pub fn query_lands<'a>(map: &'a BattlefieldMap, filter: &LandFilter) -> Vec<&'a LandState> {
    map.lands().filter(|land| filter.matches(land)).collect()
}

/// Positions of the tiles matching `filter`, for callers that go on to mutate
/// the map.
pub fn query_positions(map: &BattlefieldMap, filter: &LandFilter) -> Vec<TilePosition> {
    map.lands()
        .filter(|land| filter.matches(land))
        .map(LandState::position)
        .collect()
}
