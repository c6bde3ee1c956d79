//! Tile ownership transitions.
//!
//! A tile's controller only changes here: construction claims land, losing a
//! stronghold collapses its zone of control, and the end-of-turn recompute
//! resolves invasions and abandoned holdings.

use std::collections::HashSet;

use thiserror::Error;

use crate::{
    grid::{
        nearest_stronghold_land, tiles_in_radius, TilePosition, DEFAULT_STRONGHOLD_SEARCH_RADIUS,
    },
    land::{BattlefieldMap, BuildingKind, LandState, PlayerId},
    land_registry::{query_lands, ArmyFilter, LandFilter},
};

/// Radius around a stronghold that its owner keeps without an army.
pub const REALM_RADIUS: u32 = 1;
/// Radius around a destroyed stronghold whose land is reassigned.
pub const STRONGHOLD_COLLAPSE_RADIUS: u32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TerritoryError {
    #[error("no land at {0}")]
    UnknownTile(TilePosition),
}

/// Symmetric set of allied player pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alliances {
    pairs: HashSet<(PlayerId, PlayerId)>,
}

impl Alliances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ally(&mut self, a: PlayerId, b: PlayerId) {
        if a != b {
            self.pairs.insert(Self::pair(a, b));
        }
    }

    pub fn dissolve(&mut self, a: PlayerId, b: PlayerId) {
        self.pairs.remove(&Self::pair(a, b));
    }

    pub fn are_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        self.pairs.contains(&Self::pair(a, b))
    }

    fn pair(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Ownership changes made by [`recompute_ownership`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipReport {
    pub captured: Vec<TilePosition>,
    pub reverted: Vec<(TilePosition, Option<PlayerId>)>,
}

impl OwnershipReport {
    pub fn is_empty(&self) -> bool {
        self.captured.is_empty() && self.reverted.is_empty()
    }
}

/// Place a building for `owner`, who takes the tile. A stronghold also claims
/// the neutral land of its realm.
pub fn construct_building(
    map: &mut BattlefieldMap,
    pos: TilePosition,
    kind: BuildingKind,
    owner: PlayerId,
) -> Result<(), TerritoryError> {
    let land = map.land_mut(pos).ok_or(TerritoryError::UnknownTile(pos))?;
    land.add_building(kind);
    land.set_controller(Some(owner));

    if kind == BuildingKind::Stronghold {
        let dimensions = map.dimensions();
        for neighbor in tiles_in_radius(dimensions, pos, REALM_RADIUS, true) {
            if let Some(land) = map.land_mut(neighbor) {
                if land.is_neutral() {
                    land.set_controller(Some(owner));
                }
            }
        }
    }

    tracing::debug!(
        target: "battlefield::territory",
        tile = %pos,
        building = ?kind,
        %owner,
        "territory.building.constructed"
    );
    Ok(())
}

/// Tear down every building on `pos` and return what was removed.
///
/// When a stronghold falls, land within [`STRONGHOLD_COLLAPSE_RADIUS`] that
/// its owner still controls, holds no army and carries no stronghold of its
/// own passes to the nearest surviving stronghold's controller, or to neutral.
pub fn destroy_building(map: &mut BattlefieldMap, pos: TilePosition) -> Vec<BuildingKind> {
    let dimensions = map.dimensions();
    let Some(land) = map.land_mut(pos) else {
        return Vec::new();
    };
    let removed = land.clear_buildings();
    if !removed.contains(&BuildingKind::Stronghold) {
        return removed;
    }
    let Some(owner) = land.controller() else {
        return removed;
    };

    let mut reassigned = 0usize;
    for candidate in tiles_in_radius(dimensions, pos, STRONGHOLD_COLLAPSE_RADIUS, false) {
        let eligible = map.land(candidate).is_some_and(|land| {
            land.controller() == Some(owner) && !land.has_army() && !land.has_stronghold()
        });
        if !eligible {
            continue;
        }
        let successor = nearest_stronghold_land(candidate, map, DEFAULT_STRONGHOLD_SEARCH_RADIUS)
            .and_then(LandState::controller);
        if let Some(land) = map.land_mut(candidate) {
            land.set_controller(successor);
            reassigned += 1;
        }
    }

    tracing::info!(
        target: "battlefield::territory",
        tile = %pos,
        %owner,
        reassigned,
        "territory.stronghold.destroyed"
    );
    removed
}

/// Tiles within [`REALM_RADIUS`] of any stronghold `player` controls.
pub fn realm(map: &BattlefieldMap, player: PlayerId) -> HashSet<TilePosition> {
    map.stronghold_positions(player)
        .into_iter()
        .flat_map(|stronghold| tiles_in_radius(map.dimensions(), stronghold, REALM_RADIUS, false))
        .collect()
}

/// End-of-turn ownership pass for `player`.
///
/// First every tile holding one of the player's armies is captured unless an
/// ally controls it. Then every tile the player controls outside its realm
/// without an army of theirs reverts: to the owner of any other army still on
/// it, else to the controller of a stronghold within one hex, else to neutral.
pub fn recompute_ownership(
    map: &mut BattlefieldMap,
    player: PlayerId,
    alliances: &Alliances,
) -> OwnershipReport {
    let mut report = OwnershipReport::default();

    let invaded: Vec<TilePosition> =
        query_lands(map, &LandFilter::default().armies(ArmyFilter::OwnedBy(player)))
            .into_iter()
            .filter(|land| match land.controller() {
                None => true,
                Some(controller) => {
                    controller != player && !alliances.are_allied(controller, player)
                }
            })
            .map(LandState::position)
            .collect();
    for pos in invaded {
        if let Some(land) = map.land_mut(pos) {
            land.set_controller(Some(player));
            report.captured.push(pos);
        }
    }

    let realm = realm(map, player);
    let abandoned: Vec<TilePosition> =
        query_lands(map, &LandFilter::default().controlled_by([player]))
            .into_iter()
            .filter(|land| !realm.contains(&land.position()) && !land.has_army_of(player))
            .map(LandState::position)
            .collect();
    for pos in abandoned {
        let Some(land) = map.land(pos) else {
            continue;
        };
        let occupier = land
            .armies()
            .iter()
            .map(|army| army.controlled_by)
            .find(|owner| *owner != player);
        let successor = occupier.or_else(|| {
            nearest_stronghold_land(pos, map, REALM_RADIUS).and_then(LandState::controller)
        });
        if let Some(land) = map.land_mut(pos) {
            land.set_controller(successor);
            report.reverted.push((pos, successor));
        }
    }

    if !report.is_empty() {
        tracing::info!(
            target: "battlefield::territory",
            %player,
            captured = report.captured.len(),
            reverted = report.reverted.len(),
            "territory.ownership.recomputed"
        );
    }
    report
}
